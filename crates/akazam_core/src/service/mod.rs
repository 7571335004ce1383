//! Managers: natural-key CRUD and upsert reconciliation per entity.
//!
//! # Responsibility
//! - Validate natural keys and check existence before writes.
//! - Orchestrate repository calls and nested entity resolution.
//! - Collapse every lower-level failure into one `AccessError` kind per
//!   operation, logging the cause.
//!
//! # Invariants
//! - Managers never bypass repository validation/persistence contracts.
//! - Missing records are `Ok(None)` / `Ok(false)`, not errors.

use crate::error::AccessError;
use log::error;
use std::fmt::Display;

pub mod location_service;
pub mod social_account_service;
pub mod social_account_type_service;

/// Logs `cause` for `event` and returns the caller-facing `kind`.
pub(crate) fn fail(event: &'static str, kind: AccessError, cause: impl Display) -> AccessError {
    error!(
        "event={} module=service status=error error_code={} error={}",
        event,
        kind.code(),
        cause
    );
    kind
}
