//! Location domain model.
//!
//! # Responsibility
//! - Hold a real-world place in a shape that is easy to retrieve by name.
//! - Carry the address-derived fields produced by the normalizer.
//!
//! # Invariants
//! - `name` is required and unique across all locations.
//! - Address-derived fields (`address`, `city`, `state`, `zip_code`) are
//!   written as a group when a parsable address is supplied.

use super::{require_key, ValidationError};
use crate::address::NormalizedAddress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque storage identifier for a location.
pub type LocationId = Uuid;

/// Stored location snapshot returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    /// Natural key.
    pub name: String,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

/// Raw location payload as supplied by callers.
///
/// Used both for inserts and as a patch: `None` fields are left untouched
/// on update, `Some` fields overwrite the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationData {
    pub name: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl Location {
    /// Builds a new record with a generated id from a validated payload.
    pub fn from_data(data: &LocationData) -> Result<Self, ValidationError> {
        let name = data.require_name()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: data.address.clone(),
            zip_code: data.zip_code.clone(),
            state: data.state.clone(),
            city: data.city.clone(),
            country: data.country.clone(),
            lat: data.lat,
            long: data.long,
        })
    }

    /// Overwrites every field the patch carries; absent fields are kept.
    pub fn apply_patch(&mut self, patch: &LocationData) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if patch.address.is_some() {
            self.address = patch.address.clone();
        }
        if patch.zip_code.is_some() {
            self.zip_code = patch.zip_code.clone();
        }
        if patch.state.is_some() {
            self.state = patch.state.clone();
        }
        if patch.city.is_some() {
            self.city = patch.city.clone();
        }
        if patch.country.is_some() {
            self.country = patch.country.clone();
        }
        if patch.lat.is_some() {
            self.lat = patch.lat;
        }
        if patch.long.is_some() {
            self.long = patch.long;
        }
    }

    /// Checks invariants of a record about to be persisted or just loaded.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_key(Some(self.name.as_str()), "name").map(|_| ())
    }
}

impl LocationData {
    /// Creates a payload carrying only the natural key.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the raw address string.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns the natural key or a validation error when absent/blank.
    pub fn require_name(&self) -> Result<&str, ValidationError> {
        require_key(self.name.as_deref(), "name")
    }

    /// Resets the four address-derived fields to empty strings.
    pub fn clear_address_fields(&mut self) {
        self.address = Some(String::new());
        self.city = Some(String::new());
        self.state = Some(String::new());
        self.zip_code = Some(String::new());
    }

    /// Overlays normalizer output onto the address-derived fields.
    pub fn overlay_address(&mut self, normalized: &NormalizedAddress) {
        self.address = Some(normalized.address.clone());
        self.city = Some(normalized.city.clone());
        self.state = Some(normalized.state.clone());
        self.zip_code = Some(normalized.zip_code.clone());
    }
}
