//! Location manager.
//!
//! # Responsibility
//! - Create, read, update and delete locations by `name`.
//! - Run raw addresses through the normalizer before they are stored.
//!
//! # Invariants
//! - `create_new` without `update_if_exist` never writes over an existing
//!   location; it returns the stored snapshot instead.
//! - An update carrying a parsable address clears all four address-derived
//!   fields before overlaying the new ones, so stale parts never survive.
//! - An unparsable address is stored as given and leaves the other fields
//!   untouched.

use crate::address::{normalize, AddressParser, NormalizedAddress, UsAddressParser};
use crate::error::{AccessError, AccessResult};
use crate::model::location::{Location, LocationData};
use crate::model::require_key;
use crate::repo::location_repo::LocationRepository;
use crate::service::fail;
use log::debug;

const ENTITY: &str = "location";

/// Use-case service for location records.
pub struct LocationService<R: LocationRepository, P: AddressParser = UsAddressParser> {
    repo: R,
    parser: P,
}

impl<R: LocationRepository> LocationService<R> {
    /// Creates a service with the default US address parser.
    pub fn new(repo: R) -> Self {
        Self::with_parser(repo, UsAddressParser)
    }
}

impl<R: LocationRepository, P: AddressParser> LocationService<R, P> {
    /// Creates a service with a caller-provided address parser.
    pub fn with_parser(repo: R, parser: P) -> Self {
        Self { repo, parser }
    }

    /// Inserts `raw`, or returns the existing location with the same name.
    ///
    /// With `update_if_exist`, an existing location is overwritten with the
    /// normalized payload instead.
    ///
    /// # Errors
    /// - `AccessError::Insert` when `name` is missing or storage fails.
    pub fn create_new(&self, raw: &LocationData, update_if_exist: bool) -> AccessResult<Location> {
        let insert = AccessError::Insert(ENTITY);
        let name = raw
            .require_name()
            .map_err(|err| fail("location_create", insert, err))?;

        let existing = self
            .repo
            .find_by_name(name)
            .map_err(|err| fail("location_create", insert, err))?;
        if let Some(existing) = &existing {
            if !update_if_exist {
                debug!("event=location_create module=service status=ok outcome=existing");
                return Ok(existing.clone());
            }
        }

        let mut data = raw.clone();
        if let Some(normalized) = self.normalized_address(raw) {
            data.overlay_address(&normalized);
        }

        let saved = match existing {
            None => {
                let location =
                    Location::from_data(&data).map_err(|err| fail("location_create", insert, err))?;
                self.repo
                    .save(&location)
                    .map_err(|err| fail("location_create", insert, err))?
            }
            Some(_) => self
                .repo
                .find_one_and_update(name, &data, true)
                .map_err(|err| fail("location_create", insert, err))?
                .ok_or_else(|| fail("location_create", insert, "upsert returned no document"))?,
        };

        debug!("event=location_create module=service status=ok outcome=written");
        Ok(saved)
    }

    /// Returns the location named `name`, or `None`.
    ///
    /// # Errors
    /// - `AccessError::Read` when `name` is blank or storage fails.
    pub fn get_location_from_name(&self, name: &str) -> AccessResult<Option<Location>> {
        let read = AccessError::Read(ENTITY);
        let name = require_key(Some(name), "name").map_err(|err| fail("location_get", read, err))?;

        self.repo
            .find_by_name(name)
            .map_err(|err| fail("location_get", read, err))
    }

    /// Applies `updated` to the location named `name`.
    ///
    /// Returns `None` when nothing matched and `should_create_new` is false.
    ///
    /// # Errors
    /// - `AccessError::Update` when `name` is blank or storage fails.
    pub fn update_location_by_name(
        &self,
        name: &str,
        updated: &LocationData,
        should_create_new: bool,
    ) -> AccessResult<Option<Location>> {
        let update = AccessError::Update(ENTITY);
        let name =
            require_key(Some(name), "name").map_err(|err| fail("location_update", update, err))?;

        let mut data = updated.clone();
        if let Some(normalized) = self.normalized_address(updated) {
            data.clear_address_fields();
            data.overlay_address(&normalized);
        }

        let location = self
            .repo
            .find_one_and_update(name, &data, should_create_new)
            .map_err(|err| fail("location_update", update, err))?;
        debug!(
            "event=location_update module=service status=ok matched={}",
            location.is_some()
        );
        Ok(location)
    }

    /// Deletes the location named `name`; returns whether it existed.
    ///
    /// # Errors
    /// - `AccessError::Delete` when `name` is blank or storage fails.
    pub fn delete_location_by_name(&self, name: &str) -> AccessResult<bool> {
        let delete = AccessError::Delete(ENTITY);
        let name =
            require_key(Some(name), "name").map_err(|err| fail("location_delete", delete, err))?;

        let removed = self
            .repo
            .find_one_and_delete(name)
            .map_err(|err| fail("location_delete", delete, err))?;
        Ok(removed.is_some())
    }

    fn normalized_address(&self, data: &LocationData) -> Option<NormalizedAddress> {
        let raw = data.address.as_deref()?;
        let normalized = normalize(&self.parser, raw);
        if normalized.is_none() {
            debug!("event=address_normalize module=service status=skipped reason=unparseable");
        }
        normalized
    }
}
