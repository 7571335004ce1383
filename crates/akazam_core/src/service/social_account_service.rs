//! Social account manager.
//!
//! # Responsibility
//! - Create, read, update and delete accounts by `username`.
//! - Resolve a nested account-type payload by its own name (nested upsert)
//!   and store only the resulting foreign key.
//! - Hydrate the stored key back into the full type for every snapshot.
//!
//! # Invariants
//! - Callers never see a bare type id; snapshots carry the structured type
//!   or `None`.
//! - `update_social_account_by_username` always upserts a supplied nested
//!   type, whatever `should_create_new` says for the account itself.

use crate::error::{AccessError, AccessResult};
use crate::model::require_key;
use crate::model::social_account::{
    SocialAccount, SocialAccountData, SocialAccountPatch, SocialAccountRecord, SocialAccountType,
};
use crate::repo::social_account_repo::SocialAccountRepository;
use crate::repo::social_account_type_repo::SocialAccountTypeRepository;
use crate::service::fail;
use crate::service::social_account_type_service::SocialAccountTypeService;
use log::debug;

const ENTITY: &str = "social account";

/// Use-case service for social accounts.
pub struct SocialAccountService<A: SocialAccountRepository, T: SocialAccountTypeRepository> {
    accounts: A,
    types: SocialAccountTypeService<T>,
}

impl<A: SocialAccountRepository, T: SocialAccountTypeRepository> SocialAccountService<A, T> {
    pub fn new(accounts: A, types: T) -> Self {
        Self {
            accounts,
            types: SocialAccountTypeService::new(types),
        }
    }

    /// Type manager sharing this service's type repository.
    pub fn types(&self) -> &SocialAccountTypeService<T> {
        &self.types
    }

    /// Inserts an account, resolving its nested type by name first.
    ///
    /// The nested type goes through the type manager's `create_new` with the
    /// same `update_if_exist` flag, so an existing type is reused unless an
    /// update was requested. An existing account is returned hydrated and
    /// unchanged unless `update_if_exist` is set.
    pub fn create_new(
        &self,
        raw: &SocialAccountData,
        update_if_exist: bool,
    ) -> AccessResult<SocialAccount> {
        let insert = AccessError::Insert(ENTITY);
        let username = raw
            .require_username()
            .map_err(|err| fail("social_account_create", insert, err))?;

        let resolved_type = match &raw.social_account_type {
            Some(nested) => Some(
                self.types
                    .create_new(nested, update_if_exist)
                    .map_err(|_| insert)?,
            ),
            None => None,
        };

        let existing = self
            .accounts
            .find_by_username(username)
            .map_err(|err| fail("social_account_create", insert, err))?;

        match existing {
            Some(record) if !update_if_exist => {
                debug!("event=social_account_create module=service status=ok outcome=existing");
                self.hydrate(record, insert)
            }
            Some(_) => {
                let patch = SocialAccountPatch {
                    username: None,
                    social_account_type_id: resolved_type.as_ref().map(|kind| kind.id),
                };
                let record = self
                    .accounts
                    .find_one_and_update(username, &patch, true)
                    .map_err(|err| fail("social_account_create", insert, err))?
                    .ok_or_else(|| {
                        fail("social_account_create", insert, "upsert returned no document")
                    })?;
                debug!("event=social_account_create module=service status=ok outcome=updated");
                self.hydrate_written(record, resolved_type, insert)
            }
            None => {
                let record =
                    SocialAccountRecord::new(username, resolved_type.as_ref().map(|kind| kind.id));
                let saved = self
                    .accounts
                    .save(&record)
                    .map_err(|err| fail("social_account_create", insert, err))?;
                debug!("event=social_account_create module=service status=ok outcome=inserted");
                Ok(saved.hydrate(resolved_type))
            }
        }
    }

    /// Returns the hydrated account with `username`, or `None`.
    pub fn get_social_account_by_username(
        &self,
        username: &str,
    ) -> AccessResult<Option<SocialAccount>> {
        let read = AccessError::Read(ENTITY);
        let username = require_key(Some(username), "username")
            .map_err(|err| fail("social_account_get", read, err))?;

        let record = self
            .accounts
            .find_by_username(username)
            .map_err(|err| fail("social_account_get", read, err))?;
        record.map(|record| self.hydrate(record, read)).transpose()
    }

    /// Applies `updated` to the account with `username`.
    ///
    /// A nested type is upserted by its own name before the account is
    /// repointed at it. Returns `None` when no account matched and
    /// `should_create_new` is false.
    pub fn update_social_account_by_username(
        &self,
        username: &str,
        updated: &SocialAccountData,
        should_create_new: bool,
    ) -> AccessResult<Option<SocialAccount>> {
        let update = AccessError::Update(ENTITY);
        let username = require_key(Some(username), "username")
            .map_err(|err| fail("social_account_update", update, err))?;

        let resolved_type = match &updated.social_account_type {
            Some(nested) => {
                let type_name = nested
                    .require_name()
                    .map_err(|err| fail("social_account_update", update, err))?;
                self.types
                    .update_social_account_type_by_name(type_name, nested, true)
                    .map_err(|_| update)?
            }
            None => None,
        };

        let patch = SocialAccountPatch {
            username: updated.username.clone(),
            social_account_type_id: resolved_type.as_ref().map(|kind| kind.id),
        };
        let record = self
            .accounts
            .find_one_and_update(username, &patch, should_create_new)
            .map_err(|err| fail("social_account_update", update, err))?;
        debug!(
            "event=social_account_update module=service status=ok matched={}",
            record.is_some()
        );
        record
            .map(|record| self.hydrate_written(record, resolved_type, update))
            .transpose()
    }

    /// Deletes the account with `username`; returns whether it existed.
    pub fn delete_social_account_by_username(&self, username: &str) -> AccessResult<bool> {
        let delete = AccessError::Delete(ENTITY);
        let username = require_key(Some(username), "username")
            .map_err(|err| fail("social_account_delete", delete, err))?;

        let removed = self
            .accounts
            .find_one_and_delete(username)
            .map_err(|err| fail("social_account_delete", delete, err))?;
        Ok(removed.is_some())
    }

    /// Hydrates a record that was just written.
    ///
    /// When the write pointed the record at `resolved`, that type is used
    /// directly. Otherwise the stored reference is looked up; a failure there
    /// is reported as `kind` even though the write itself is committed.
    fn hydrate_written(
        &self,
        record: SocialAccountRecord,
        resolved: Option<SocialAccountType>,
        kind: AccessError,
    ) -> AccessResult<SocialAccount> {
        match resolved {
            Some(resolved) if record.social_account_type_id == Some(resolved.id) => {
                Ok(record.hydrate(Some(resolved)))
            }
            _ => self.hydrate(record, kind),
        }
    }

    fn hydrate(&self, record: SocialAccountRecord, kind: AccessError) -> AccessResult<SocialAccount> {
        let social_account_type = match record.social_account_type_id {
            Some(id) => self
                .types
                .get_social_account_type_by_id(id)
                .map_err(|_| kind)?,
            None => None,
        };
        Ok(record.hydrate(social_account_type))
    }
}
