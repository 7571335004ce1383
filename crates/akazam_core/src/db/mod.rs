//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Establish the process-wide connection from a URI and options.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must not read/write documents before migrations succeed.
//! - Callers of [`init`] only ever see [`ConnectionError`]; the cause is logged.

use std::time::Duration;
use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{init, open_db, open_db_in_memory, open_with_options};

pub type DbResult<T> = Result<T, DbError>;

/// Detailed storage bootstrap failure.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(
        "database schema version {db_version} is newer than supported {latest_supported}"
    )]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("unsupported database uri `{0}`")]
    InvalidUri(String),
    #[error("read-only mode needs a database file, not an in-memory target")]
    ReadOnlyMemory,
}

/// Caller-facing connection establishment failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unable to establish connection")]
pub struct ConnectionError;

/// Tunables applied while establishing a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Create the database file when it does not exist yet.
    pub create_if_missing: bool,
    /// Open read-only. Migrations are skipped; repositories reject a stale schema.
    /// Not available for in-memory targets, which start empty.
    pub read_only: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            create_if_missing: true,
            read_only: false,
        }
    }
}

/// Storage target resolved from a connection URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    Memory,
    /// Filesystem path, or a `file:` URI handed to SQLite unchanged so its
    /// query parameters (`mode`, `cache`, ...) still apply.
    File(std::path::PathBuf),
}

impl DbTarget {
    /// Resolves `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
    /// `file:<path>[?query]` or a bare path.
    pub fn parse(uri: &str) -> DbResult<Self> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(DbError::InvalidUri(uri.to_string()));
        }

        if trimmed == ":memory:" || trimmed == "sqlite::memory:" {
            return Ok(Self::Memory);
        }

        let path = if let Some(rest) = trimmed.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("file:") {
            if rest.is_empty() {
                return Err(DbError::InvalidUri(uri.to_string()));
            }
            trimmed
        } else if trimmed.contains("://") {
            return Err(DbError::InvalidUri(uri.to_string()));
        } else {
            trimmed
        };

        if path.is_empty() {
            return Err(DbError::InvalidUri(uri.to_string()));
        }
        Ok(Self::File(path.into()))
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}
