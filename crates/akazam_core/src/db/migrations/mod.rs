//! Contacts schema steps, tracked through `PRAGMA user_version`.
//!
//! Each step owns one SQL file. A database at version `n` has run every step
//! up to and including `n`; newer steps run in a single transaction so a
//! failed upgrade leaves the previous version in place.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "locations",
        sql: include_str!("0001_locations.sql"),
    },
    SchemaStep {
        version: 2,
        name: "social_accounts",
        sql: include_str!("0002_social_accounts.sql"),
    },
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Rejects databases written by a newer build; returns the stored version.
pub fn ensure_supported(conn: &Connection) -> DbResult<u32> {
    let db_version = current_user_version(conn)?;
    let latest_supported = latest_version();
    if db_version > latest_supported {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        });
    }
    Ok(db_version)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = ensure_supported(conn)?;
    if from == latest_version() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > from) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate module=db status=ok version={} step={}",
            step.version, step.name
        );
    }
    tx.commit()?;
    Ok(())
}
