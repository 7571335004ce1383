//! Social account type manager.
//!
//! Same existence/upsert pattern as the location manager, keyed by
//! `socialAccountTypeName`, without any address handling.

use crate::error::{AccessError, AccessResult};
use crate::model::require_key;
use crate::model::social_account::{
    SocialAccountType, SocialAccountTypeData, SocialAccountTypeId,
};
use crate::repo::social_account_type_repo::SocialAccountTypeRepository;
use crate::service::fail;
use log::debug;

const ENTITY: &str = "social account type";
const KEY: &str = "socialAccountTypeName";

/// Use-case service for the account-type taxonomy.
pub struct SocialAccountTypeService<R: SocialAccountTypeRepository> {
    repo: R,
}

impl<R: SocialAccountTypeRepository> SocialAccountTypeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts `raw`, or returns the existing type with the same name.
    ///
    /// With `update_if_exist`, an existing type is overwritten instead.
    pub fn create_new(
        &self,
        raw: &SocialAccountTypeData,
        update_if_exist: bool,
    ) -> AccessResult<SocialAccountType> {
        let insert = AccessError::Insert(ENTITY);
        let name = raw
            .require_name()
            .map_err(|err| fail("social_account_type_create", insert, err))?;

        let existing = self
            .repo
            .find_by_name(name)
            .map_err(|err| fail("social_account_type_create", insert, err))?;

        let saved = match existing {
            Some(existing) if !update_if_exist => {
                debug!("event=social_account_type_create module=service status=ok outcome=existing");
                return Ok(existing);
            }
            Some(_) => self
                .repo
                .find_one_and_update(name, raw, true)
                .map_err(|err| fail("social_account_type_create", insert, err))?
                .ok_or_else(|| {
                    fail(
                        "social_account_type_create",
                        insert,
                        "upsert returned no document",
                    )
                })?,
            None => {
                let created = SocialAccountType::from_data(raw)
                    .map_err(|err| fail("social_account_type_create", insert, err))?;
                self.repo
                    .save(&created)
                    .map_err(|err| fail("social_account_type_create", insert, err))?
            }
        };

        debug!("event=social_account_type_create module=service status=ok outcome=written");
        Ok(saved)
    }

    /// Returns the type named `name`, or `None`.
    pub fn get_social_account_type_by_name(
        &self,
        name: &str,
    ) -> AccessResult<Option<SocialAccountType>> {
        let read = AccessError::Read(ENTITY);
        let name =
            require_key(Some(name), KEY).map_err(|err| fail("social_account_type_get", read, err))?;

        self.repo
            .find_by_name(name)
            .map_err(|err| fail("social_account_type_get", read, err))
    }

    /// Resolves a stored foreign key; used when hydrating accounts.
    pub fn get_social_account_type_by_id(
        &self,
        id: SocialAccountTypeId,
    ) -> AccessResult<Option<SocialAccountType>> {
        self.repo
            .find_by_id(id)
            .map_err(|err| fail("social_account_type_get", AccessError::Read(ENTITY), err))
    }

    /// Applies `updated` to the type named `name`.
    ///
    /// Returns `None` when nothing matched and `should_create_new` is false.
    pub fn update_social_account_type_by_name(
        &self,
        name: &str,
        updated: &SocialAccountTypeData,
        should_create_new: bool,
    ) -> AccessResult<Option<SocialAccountType>> {
        let update = AccessError::Update(ENTITY);
        let name = require_key(Some(name), KEY)
            .map_err(|err| fail("social_account_type_update", update, err))?;

        let updated = self
            .repo
            .find_one_and_update(name, updated, should_create_new)
            .map_err(|err| fail("social_account_type_update", update, err))?;
        debug!(
            "event=social_account_type_update module=service status=ok matched={}",
            updated.is_some()
        );
        Ok(updated)
    }

    /// Deletes the type named `name`; returns whether it existed.
    ///
    /// Accounts pointing at it are kept and lose their type reference.
    pub fn delete_social_account_type_by_name(&self, name: &str) -> AccessResult<bool> {
        let delete = AccessError::Delete(ENTITY);
        let name = require_key(Some(name), KEY)
            .map_err(|err| fail("social_account_type_delete", delete, err))?;

        let removed = self
            .repo
            .find_one_and_delete(name)
            .map_err(|err| fail("social_account_type_delete", delete, err))?;
        Ok(removed.is_some())
    }
}
