//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by the repositories.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::{apply_migrations, ensure_supported};
use super::{ConnectionError, ConnectionOptions, DbError, DbResult, DbTarget};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Instant;

/// Establishes the application connection described by `uri`.
///
/// This is the only entry point the process needs at startup. Any failure is
/// logged with its cause and reported as [`ConnectionError`].
pub fn init(uri: &str, options: &ConnectionOptions) -> Result<Connection, ConnectionError> {
    let target = match DbTarget::parse(uri) {
        Ok(target) => target,
        Err(err) => {
            error!(
                "event=db_open module=db status=error error_code=db_uri_invalid error={}",
                err
            );
            return Err(ConnectionError);
        }
    };

    open_with_options(&target, options).map_err(|_| ConnectionError)
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let target = DbTarget::File(path.as_ref().to_path_buf());
    open_with_options(&target, &ConnectionOptions::default())
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with_options(&DbTarget::Memory, &ConnectionOptions::default())
}

/// Opens `target` honoring `options`, then bootstraps the schema.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_with_options(target: &DbTarget, options: &ConnectionOptions) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = target.mode();
    info!("event=db_open module=db status=start mode={mode}");

    if options.read_only && *target == DbTarget::Memory {
        error!(
            "event=db_open module=db status=error mode={mode} error_code=db_read_only_memory"
        );
        return Err(DbError::ReadOnlyMemory);
    }

    let opened = match target {
        DbTarget::Memory => Connection::open_in_memory(),
        DbTarget::File(path) => Connection::open_with_flags(path, open_flags(options)),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, options) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn open_flags(options: &ConnectionOptions) -> OpenFlags {
    let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if options.read_only {
        flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
    } else {
        flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
        if options.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
    }
    flags
}

fn bootstrap_connection(conn: &mut Connection, options: &ConnectionOptions) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(options.busy_timeout)?;

    if options.read_only {
        ensure_supported(conn)?;
        return Ok(());
    }

    apply_migrations(conn)?;
    Ok(())
}
