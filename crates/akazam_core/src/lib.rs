//! Data-access core for the Akazam contacts/locations application.
//!
//! Exposes natural-key CRUD with upsert reconciliation for locations,
//! social account types and social accounts over an embedded SQLite store.

pub mod address;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use address::{normalize, AddressParser, NormalizedAddress, ParsedAddress, UsAddressParser};
pub use config::{AppConfig, ConfigError};
pub use db::{init, ConnectionError, ConnectionOptions};
pub use error::{AccessError, AccessResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::location::{Location, LocationData};
pub use model::social_account::{
    SocialAccount, SocialAccountData, SocialAccountType, SocialAccountTypeData,
};
pub use model::ValidationError;
pub use repo::location_repo::{LocationRepository, SqliteLocationRepository};
pub use repo::social_account_repo::{SocialAccountRepository, SqliteSocialAccountRepository};
pub use repo::social_account_type_repo::{
    SocialAccountTypeRepository, SqliteSocialAccountTypeRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::location_service::LocationService;
pub use service::social_account_service::SocialAccountService;
pub use service::social_account_type_service::SocialAccountTypeService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
