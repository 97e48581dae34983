use std::env;
use std::path::PathBuf;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::error::ScoringError;
use crate::metrics::ScoringConfig;

/// Runtime settings for the scoring CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub metrics_file: Option<PathBuf>,
    pub telemetry: TelemetryConfig,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
    pub show_target: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SCORING_DB_MAX_CONNECTIONS must be a positive integer, got '{0}'")]
    InvalidMaxConnections(String),
    #[error("invalid log level/filter '{value}'")]
    InvalidLogFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to load metric overrides from {path}")]
    MetricOverrides {
        path: PathBuf,
        #[source]
        source: ScoringError,
    },
}

impl TelemetryConfig {
    /// `RUST_LOG` wins over the configured level.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => parse_filter(&self.log_level),
        }
    }
}

fn parse_filter(value: &str) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_new(value).map_err(|source| ConfigError::InvalidLogFilter {
        value: value.to_string(),
        source,
    })
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let max_connections = match env::var("SCORING_DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidMaxConnections(raw))?,
            Err(_) => 5,
        };

        let metrics_file = env::var("SCORING_METRICS_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let log_level = env::var("SCORING_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_filter(&log_level)?;

        Ok(Self {
            database_url,
            max_connections,
            metrics_file,
            telemetry: TelemetryConfig {
                log_level,
                ansi: env_flag("SCORING_LOG_ANSI"),
                show_target: env_flag("SCORING_LOG_TARGET"),
            },
        })
    }

    /// Compiled-in weights, or the override file when one is configured.
    pub fn scoring_config(&self) -> Result<ScoringConfig, ConfigError> {
        match &self.metrics_file {
            Some(path) => {
                ScoringConfig::from_file(path).map_err(|source| ConfigError::MetricOverrides {
                    path: path.clone(),
                    source,
                })
            }
            None => Ok(ScoringConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("DATABASE_URL");
        env::remove_var("SCORING_DB_MAX_CONNECTIONS");
        env::remove_var("SCORING_METRICS_FILE");
        env::remove_var("SCORING_LOG_LEVEL");
        env::remove_var("SCORING_LOG_ANSI");
        env::remove_var("SCORING_LOG_TARGET");
        env::remove_var("RUST_LOG");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.ansi);
        assert!(!config.telemetry.show_target);
        assert!(config.metrics_file.is_none());
        assert_eq!(
            config.scoring_config().expect("default weights"),
            ScoringConfig::default()
        );
        assert!(config.telemetry.env_filter().is_ok());
    }

    #[test]
    fn rejects_zero_pool_size() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_DB_MAX_CONNECTIONS", "0");
        let err = AppConfig::load().expect_err("zero connections rejected");
        assert!(matches!(err, ConfigError::InvalidMaxConnections(_)));
        reset_env();
    }

    #[test]
    fn rejects_unparseable_log_filter() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_LOG_LEVEL", "scoring=verbose");
        let err = AppConfig::load().expect_err("bad filter rejected");
        assert!(matches!(err, ConfigError::InvalidLogFilter { ref value, .. } if value == "scoring=verbose"));
        reset_env();
    }

    #[test]
    fn log_flags_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_LOG_ANSI", "TRUE");
        env::set_var("SCORING_LOG_TARGET", "1");
        let config = AppConfig::load().expect("config loads");
        assert!(config.telemetry.ansi);
        assert!(config.telemetry.show_target);
        reset_env();
    }

    #[test]
    fn missing_metrics_file_is_a_config_error() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_METRICS_FILE", "/nonexistent/metrics.json");
        let config = AppConfig::load().expect("config loads");
        let err = config.scoring_config().expect_err("file missing");
        assert!(matches!(
            err,
            ConfigError::MetricOverrides {
                source: ScoringError::Io { .. },
                ..
            }
        ));
        reset_env();
    }
}
