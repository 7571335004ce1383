//! Social account type repository contract and SQLite implementation.
//!
//! # Invariants
//! - `social_account_type_name` uniqueness is enforced by the table.
//! - Deleting a type detaches referencing accounts (`ON DELETE SET NULL`).

use super::{ensure_connection_ready, map_unique_violation, parse_uuid, RepoResult};
use crate::model::social_account::{
    SocialAccountType, SocialAccountTypeData, SocialAccountTypeId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TYPE_SELECT_SQL: &str = "SELECT id, social_account_type_name, link FROM social_account_types";
const TYPE_COLUMNS: &[&str] = &["id", "social_account_type_name", "link"];

/// Storage contract for account types, keyed by `social_account_type_name`.
pub trait SocialAccountTypeRepository {
    fn find_by_name(&self, name: &str) -> RepoResult<Option<SocialAccountType>>;
    /// Foreign-key lookup used to hydrate accounts.
    fn find_by_id(&self, id: SocialAccountTypeId) -> RepoResult<Option<SocialAccountType>>;
    fn save(&self, social_account_type: &SocialAccountType) -> RepoResult<SocialAccountType>;
    fn find_one_and_update(
        &self,
        name: &str,
        patch: &SocialAccountTypeData,
        upsert: bool,
    ) -> RepoResult<Option<SocialAccountType>>;
    fn find_one_and_delete(&self, name: &str) -> RepoResult<Option<SocialAccountType>>;
}

/// SQLite-backed account type repository.
pub struct SqliteSocialAccountTypeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSocialAccountTypeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "social_account_types", TYPE_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl SocialAccountTypeRepository for SqliteSocialAccountTypeRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Option<SocialAccountType>> {
        select_one(self.conn, "social_account_type_name", name)
    }

    fn find_by_id(&self, id: SocialAccountTypeId) -> RepoResult<Option<SocialAccountType>> {
        select_one(self.conn, "id", &id.to_string())
    }

    fn save(&self, social_account_type: &SocialAccountType) -> RepoResult<SocialAccountType> {
        social_account_type.validate()?;
        insert_row(self.conn, social_account_type)?;
        Ok(social_account_type.clone())
    }

    fn find_one_and_update(
        &self,
        name: &str,
        patch: &SocialAccountTypeData,
        upsert: bool,
    ) -> RepoResult<Option<SocialAccountType>> {
        let tx = self.conn.unchecked_transaction()?;

        let updated = match select_one(&tx, "social_account_type_name", name)? {
            Some(mut existing) => {
                existing.apply_patch(patch);
                existing.validate()?;
                tx.execute(
                    "UPDATE social_account_types
                     SET social_account_type_name = ?2, link = ?3
                     WHERE id = ?1;",
                    params![
                        existing.id.to_string(),
                        existing.social_account_type_name.as_str(),
                        existing.link.as_deref(),
                    ],
                )
                .map_err(|err| {
                    map_unique_violation(err, "social_account_types", "social_account_type_name")
                })?;
                Some(existing)
            }
            None if upsert => {
                let mut data = patch.clone();
                if data.social_account_type_name.is_none() {
                    data.social_account_type_name = Some(name.to_string());
                }
                let created = SocialAccountType::from_data(&data)?;
                insert_row(&tx, &created)?;
                Some(created)
            }
            None => None,
        };

        tx.commit()?;
        Ok(updated)
    }

    fn find_one_and_delete(&self, name: &str) -> RepoResult<Option<SocialAccountType>> {
        let tx = self.conn.unchecked_transaction()?;

        let removed = select_one(&tx, "social_account_type_name", name)?;
        if let Some(existing) = &removed {
            tx.execute(
                "DELETE FROM social_account_types WHERE id = ?1;",
                [existing.id.to_string()],
            )?;
        }

        tx.commit()?;
        Ok(removed)
    }
}

fn select_one(
    conn: &Connection,
    key_column: &'static str,
    key: &str,
) -> RepoResult<Option<SocialAccountType>> {
    let mut stmt = conn.prepare(&format!("{TYPE_SELECT_SQL} WHERE {key_column} = ?1;"))?;
    let row = stmt.query_row([key], read_row).optional()?;
    row.map(|(id, name, link)| decode(id, name, link)).transpose()
}

fn insert_row(conn: &Connection, social_account_type: &SocialAccountType) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO social_account_types (id, social_account_type_name, link)
         VALUES (?1, ?2, ?3);",
        params![
            social_account_type.id.to_string(),
            social_account_type.social_account_type_name.as_str(),
            social_account_type.link.as_deref(),
        ],
    )
    .map_err(|err| map_unique_violation(err, "social_account_types", "social_account_type_name"))?;
    Ok(())
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<(String, String, Option<String>)> {
    Ok((
        row.get("id")?,
        row.get("social_account_type_name")?,
        row.get("link")?,
    ))
}

fn decode(id: String, name: String, link: Option<String>) -> RepoResult<SocialAccountType> {
    let social_account_type = SocialAccountType {
        id: parse_uuid(&id, "social_account_types.id")?,
        social_account_type_name: name,
        link,
    };
    social_account_type.validate()?;
    Ok(social_account_type)
}
