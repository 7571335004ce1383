//! Environment-driven process configuration.
//!
//! Reads a `.env` file when one exists, then the process environment.
//! Every key has a default so a bare checkout starts against a local
//! SQLite file.

use crate::db::ConnectionOptions;
use crate::logging::default_log_level;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DB_URI: &str = "sqlite://akazam.sqlite3";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("cannot resolve working directory for default log dir: {0}")]
    WorkingDir(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub db_uri: String,
    pub db_busy_timeout: Duration,
    pub db_read_only: bool,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_busy_timeout = match non_empty("DB_BUSY_TIMEOUT_MS") {
            Some(value) => Duration::from_millis(value.trim().parse().map_err(|_| {
                ConfigError::InvalidValue {
                    key: "DB_BUSY_TIMEOUT_MS",
                    value,
                }
            })?),
            None => Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        };

        let db_read_only = match non_empty("DB_READ_ONLY") {
            Some(value) => parse_bool("DB_READ_ONLY", value)?,
            None => false,
        };

        let log_dir = match non_empty("LOG_DIR") {
            Some(value) => PathBuf::from(value),
            None => env::current_dir()
                .map_err(|err| ConfigError::WorkingDir(err.to_string()))?
                .join("logs"),
        };

        Ok(Self {
            db_uri: non_empty("DB_URI").unwrap_or_else(|| DEFAULT_DB_URI.to_string()),
            db_busy_timeout,
            db_read_only,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
        })
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            busy_timeout: self.db_busy_timeout,
            create_if_missing: !self.db_read_only,
            read_only: self.db_read_only,
        }
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}
