//! Domain records and caller payloads for the contacts core.
//!
//! # Responsibility
//! - Define the canonical stored shape of every entity.
//! - Define loosely-typed input payloads (`*Data`) that double as patches.
//! - Validate natural keys before anything reaches persistence.
//!
//! # Invariants
//! - Every stored record has a stable generated `id`, never used for lookup
//!   by callers.
//! - Natural keys (`name`, `socialAccountTypeName`, `username`) are never
//!   empty once stored.
//! - Deletion is a hard delete; there are no tombstones.

use thiserror::Error;

pub mod location;
pub mod social_account;

/// Payload validation failure raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required natural key `{field}`")]
    MissingNaturalKey { field: &'static str },
}

/// Returns the trimmed-non-empty natural key, or a validation error.
pub(crate) fn require_key<'a>(
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ValidationError::MissingNaturalKey { field }),
    }
}
