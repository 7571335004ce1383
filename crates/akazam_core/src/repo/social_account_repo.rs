//! Social account repository contract and SQLite implementation.
//!
//! # Invariants
//! - `username` is not unique; lookups by username return the earliest
//!   inserted row (lowest `rowid`).
//! - Rows store the type as a bare foreign key; hydration happens in the
//!   social account service.

use super::{ensure_connection_ready, parse_uuid, RepoResult};
use crate::model::social_account::{SocialAccountPatch, SocialAccountRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACCOUNT_COLUMNS: &[&str] = &["id", "username", "social_account_type_id"];

/// Storage contract for account rows, keyed by `username`.
pub trait SocialAccountRepository {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<SocialAccountRecord>>;
    fn save(&self, record: &SocialAccountRecord) -> RepoResult<SocialAccountRecord>;
    fn find_one_and_update(
        &self,
        username: &str,
        patch: &SocialAccountPatch,
        upsert: bool,
    ) -> RepoResult<Option<SocialAccountRecord>>;
    fn find_one_and_delete(&self, username: &str) -> RepoResult<Option<SocialAccountRecord>>;
}

/// SQLite-backed account repository.
pub struct SqliteSocialAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSocialAccountRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "social_accounts", ACCOUNT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl SocialAccountRepository for SqliteSocialAccountRepository<'_> {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<SocialAccountRecord>> {
        select_by_username(self.conn, username)
    }

    fn save(&self, record: &SocialAccountRecord) -> RepoResult<SocialAccountRecord> {
        record.validate()?;
        insert_row(self.conn, record)?;
        Ok(record.clone())
    }

    fn find_one_and_update(
        &self,
        username: &str,
        patch: &SocialAccountPatch,
        upsert: bool,
    ) -> RepoResult<Option<SocialAccountRecord>> {
        let tx = self.conn.unchecked_transaction()?;

        let updated = match select_by_username(&tx, username)? {
            Some(mut record) => {
                record.apply_patch(patch);
                record.validate()?;
                tx.execute(
                    "UPDATE social_accounts
                     SET username = ?2, social_account_type_id = ?3
                     WHERE id = ?1;",
                    params![
                        record.id.to_string(),
                        record.username.as_str(),
                        record.social_account_type_id.map(|id| id.to_string()),
                    ],
                )?;
                Some(record)
            }
            None if upsert => {
                let username = patch.username.as_deref().unwrap_or(username);
                let record = SocialAccountRecord::new(username, patch.social_account_type_id);
                record.validate()?;
                insert_row(&tx, &record)?;
                Some(record)
            }
            None => None,
        };

        tx.commit()?;
        Ok(updated)
    }

    fn find_one_and_delete(&self, username: &str) -> RepoResult<Option<SocialAccountRecord>> {
        let tx = self.conn.unchecked_transaction()?;

        let removed = select_by_username(&tx, username)?;
        if let Some(record) = &removed {
            tx.execute(
                "DELETE FROM social_accounts WHERE id = ?1;",
                [record.id.to_string()],
            )?;
        }

        tx.commit()?;
        Ok(removed)
    }
}

fn select_by_username(
    conn: &Connection,
    username: &str,
) -> RepoResult<Option<SocialAccountRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, social_account_type_id
         FROM social_accounts
         WHERE username = ?1
         ORDER BY rowid ASC
         LIMIT 1;",
    )?;
    let row = stmt.query_row([username], read_row).optional()?;
    row.map(|(id, username, type_id)| decode(id, username, type_id))
        .transpose()
}

fn insert_row(conn: &Connection, record: &SocialAccountRecord) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO social_accounts (id, username, social_account_type_id)
         VALUES (?1, ?2, ?3);",
        params![
            record.id.to_string(),
            record.username.as_str(),
            record.social_account_type_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<(String, String, Option<String>)> {
    Ok((
        row.get("id")?,
        row.get("username")?,
        row.get("social_account_type_id")?,
    ))
}

fn decode(
    id: String,
    username: String,
    type_id: Option<String>,
) -> RepoResult<SocialAccountRecord> {
    let social_account_type_id = match type_id {
        Some(value) => Some(parse_uuid(&value, "social_accounts.social_account_type_id")?),
        None => None,
    };
    let record = SocialAccountRecord {
        id: parse_uuid(&id, "social_accounts.id")?,
        username,
        social_account_type_id,
    };
    record.validate()?;
    Ok(record)
}
