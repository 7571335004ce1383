//! Caller-facing error taxonomy for manager operations.
//!
//! Managers log the underlying cause and hand back only the operation kind
//! and the entity it concerned. "Not found" is never an error.

use thiserror::Error;

pub use crate::db::ConnectionError;
pub use crate::model::ValidationError;

pub type AccessResult<T> = Result<T, AccessError>;

/// Coarse failure kind of a manager operation, tagged with the entity name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("cannot create new {0}")]
    Insert(&'static str),
    #[error("could not read {0}")]
    Read(&'static str),
    #[error("could not update {0}")]
    Update(&'static str),
    #[error("could not delete {0}")]
    Delete(&'static str),
}

impl AccessError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert_failed",
            Self::Read(_) => "read_failed",
            Self::Update(_) => "update_failed",
            Self::Delete(_) => "delete_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AccessError;

    #[test]
    fn messages_are_fixed_per_kind() {
        assert_eq!(
            AccessError::Insert("location").to_string(),
            "cannot create new location"
        );
        assert_eq!(
            AccessError::Delete("social account").to_string(),
            "could not delete social account"
        );
        assert_eq!(AccessError::Read("location").code(), "read_failed");
    }
}
