//! Impact and activity scoring for engineering teams, with Silent Architect
//! classification (high impact, low visible activity).

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod import;
pub mod mapper;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod quality;
pub mod report;
pub mod store;
pub mod telemetry;

pub use engine::{ScoringEngine, ScoringStrategy};
pub use error::ScoringError;
pub use metrics::ScoringConfig;
pub use models::{ScoreResult, ScoringMode};
pub use store::{RecordStore, Snapshot, SnapshotParts};
