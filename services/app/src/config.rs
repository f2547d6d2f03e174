//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base address of the conversion/chat backend. Owned by the deployment,
    /// not by any component in this repository.
    pub backend_url: String,
    /// Directory holding the locally persisted document collection.
    pub storage_dir: PathBuf,
    pub log_level: Level,
    /// Upload covers server-side OCR, which takes minutes rather than seconds.
    pub upload_timeout: Duration,
    pub chat_timeout: Duration,
    /// Applied to the connection and health probes.
    pub probe_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Backend and Storage Settings ---
        let backend_url_raw = std::env::var("BACKEND_URL")
            .map_err(|_| ConfigError::MissingVar("BACKEND_URL".to_string()))?;
        reqwest::Url::parse(&backend_url_raw).map_err(|e| {
            ConfigError::InvalidValue("BACKEND_URL".to_string(), e.to_string())
        })?;
        let backend_url = backend_url_raw.trim_end_matches('/').to_string();

        let storage_dir = std::env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Network Timeouts ---
        let upload_timeout = duration_var("UPLOAD_TIMEOUT_SECS", 120)?;
        let chat_timeout = duration_var("CHAT_TIMEOUT_SECS", 30)?;
        let probe_timeout = duration_var("PROBE_TIMEOUT_SECS", 5)?;

        Ok(Self {
            backend_url,
            storage_dir,
            log_level,
            upload_timeout,
            chat_timeout,
            probe_timeout,
        })
    }
}

/// Reads a whole-second duration from the environment, with a default.
fn duration_var(name: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => {
            let secs = raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    name.to_string(),
                    format!("'{}' is not a whole number of seconds", raw),
                )
            })?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}
