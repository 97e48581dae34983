use std::path::PathBuf;

use crate::metrics::{Archetype, Bucket};
use crate::models::EmployeeId;

/// Failures surfaced by the scoring library. Missing mappings and empty
/// denominators are not errors; they degrade to zero-valued contributions.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
    #[error("team '{0}' not found")]
    TeamNotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid metrics file {path}: {source}")]
    MetricsFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("weight for {bucket:?} in {archetype:?} must be non-negative, got {weight}")]
    InvalidWeight {
        archetype: Archetype,
        bucket: Bucket,
        weight: f64,
    },
    #[error("record store query failed: {0}")]
    Database(#[from] sqlx::Error),
}
