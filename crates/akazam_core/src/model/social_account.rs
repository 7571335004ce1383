//! Social account and social account type models.
//!
//! # Responsibility
//! - Describe the account-type taxonomy (`SocialAccountType`).
//! - Describe accounts that point at a type by foreign key.
//! - Provide the hydrated snapshot handed back to callers.
//!
//! # Invariants
//! - `social_account_type_name` is required and unique.
//! - `username` is required but not unique.
//! - Stored accounts reference a type by id only; the nested structure is
//!   resolved on read.

use super::{require_key, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SocialAccountTypeId = Uuid;
pub type SocialAccountId = Uuid;

/// Stored account-type snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAccountType {
    pub id: SocialAccountTypeId,
    /// Natural key.
    pub social_account_type_name: String,
    pub link: Option<String>,
}

/// Raw account-type payload; doubles as a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialAccountTypeData {
    pub social_account_type_name: Option<String>,
    pub link: Option<String>,
}

/// Account row as persisted: the type is a bare foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialAccountRecord {
    pub id: SocialAccountId,
    pub username: String,
    pub social_account_type_id: Option<SocialAccountTypeId>,
}

/// Partial update applied to a stored account row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialAccountPatch {
    pub username: Option<String>,
    pub social_account_type_id: Option<SocialAccountTypeId>,
}

/// Hydrated account snapshot returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAccount {
    pub id: SocialAccountId,
    pub username: String,
    pub social_account_type: Option<SocialAccountType>,
}

/// Raw account payload with an optional nested type to upsert by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialAccountData {
    pub username: Option<String>,
    pub social_account_type: Option<SocialAccountTypeData>,
}

impl SocialAccountType {
    pub fn from_data(data: &SocialAccountTypeData) -> Result<Self, ValidationError> {
        let name = data.require_name()?;
        Ok(Self {
            id: Uuid::new_v4(),
            social_account_type_name: name.to_string(),
            link: data.link.clone(),
        })
    }

    /// Overwrites every field the patch carries; absent fields are kept.
    pub fn apply_patch(&mut self, patch: &SocialAccountTypeData) {
        if let Some(name) = &patch.social_account_type_name {
            self.social_account_type_name = name.clone();
        }
        if patch.link.is_some() {
            self.link = patch.link.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_key(
            Some(self.social_account_type_name.as_str()),
            "socialAccountTypeName",
        )
        .map(|_| ())
    }
}

impl SocialAccountTypeData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            social_account_type_name: Some(name.into()),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn require_name(&self) -> Result<&str, ValidationError> {
        require_key(
            self.social_account_type_name.as_deref(),
            "socialAccountTypeName",
        )
    }
}

impl SocialAccountRecord {
    pub fn new(username: impl Into<String>, type_id: Option<SocialAccountTypeId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            social_account_type_id: type_id,
        }
    }

    pub fn apply_patch(&mut self, patch: &SocialAccountPatch) {
        if let Some(username) = &patch.username {
            self.username = username.clone();
        }
        if patch.social_account_type_id.is_some() {
            self.social_account_type_id = patch.social_account_type_id;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_key(Some(self.username.as_str()), "username").map(|_| ())
    }

    /// Joins this row with its already-loaded type.
    pub fn hydrate(self, social_account_type: Option<SocialAccountType>) -> SocialAccount {
        SocialAccount {
            id: self.id,
            username: self.username,
            social_account_type,
        }
    }
}

impl SocialAccountData {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            social_account_type: None,
        }
    }

    pub fn with_type(mut self, social_account_type: SocialAccountTypeData) -> Self {
        self.social_account_type = Some(social_account_type);
        self
    }

    pub fn require_username(&self) -> Result<&str, ValidationError> {
        require_key(self.username.as_deref(), "username")
    }
}
