//! Location repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide natural-key CRUD over the `locations` collection.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `name` uniqueness is enforced by the table, not by callers.
//! - Read paths reject invalid persisted state instead of masking it.

use super::{ensure_connection_ready, map_unique_violation, parse_uuid, RepoResult};
use crate::model::location::{Location, LocationData};
use rusqlite::{params, Connection, OptionalExtension, Row};

const LOCATION_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    zip_code,
    state,
    city,
    country,
    lat,
    long
FROM locations";

const LOCATION_COLUMNS: &[&str] = &[
    "id", "name", "address", "zip_code", "state", "city", "country", "lat", "long",
];

/// Storage contract for locations, keyed by `name`.
pub trait LocationRepository {
    /// Returns the location with `name`, if any.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Location>>;
    /// Inserts a new location. Fails with `UniqueViolation` on a taken name.
    fn save(&self, location: &Location) -> RepoResult<Location>;
    /// Applies `patch` to the location named `name` and returns the result.
    ///
    /// With `upsert`, a missing location is inserted from the patch (named
    /// `name` unless the patch renames it). Without it a miss returns `None`.
    fn find_one_and_update(
        &self,
        name: &str,
        patch: &LocationData,
        upsert: bool,
    ) -> RepoResult<Option<Location>>;
    /// Removes the location named `name`, returning what was removed.
    fn find_one_and_delete(&self, name: &str) -> RepoResult<Option<Location>>;
}

/// SQLite-backed location repository.
pub struct SqliteLocationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLocationRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "locations", LOCATION_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl LocationRepository for SqliteLocationRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Location>> {
        select_by_name(self.conn, name)
    }

    fn save(&self, location: &Location) -> RepoResult<Location> {
        location.validate()?;
        insert_row(self.conn, location)?;
        Ok(location.clone())
    }

    fn find_one_and_update(
        &self,
        name: &str,
        patch: &LocationData,
        upsert: bool,
    ) -> RepoResult<Option<Location>> {
        let tx = self.conn.unchecked_transaction()?;

        let updated = match select_by_name(&tx, name)? {
            Some(mut location) => {
                location.apply_patch(patch);
                location.validate()?;
                update_row(&tx, &location)?;
                Some(location)
            }
            None if upsert => {
                let mut data = patch.clone();
                if data.name.is_none() {
                    data.name = Some(name.to_string());
                }
                let location = Location::from_data(&data)?;
                insert_row(&tx, &location)?;
                Some(location)
            }
            None => None,
        };

        tx.commit()?;
        Ok(updated)
    }

    fn find_one_and_delete(&self, name: &str) -> RepoResult<Option<Location>> {
        let tx = self.conn.unchecked_transaction()?;

        let removed = select_by_name(&tx, name)?;
        if let Some(location) = &removed {
            tx.execute(
                "DELETE FROM locations WHERE id = ?1;",
                [location.id.to_string()],
            )?;
        }

        tx.commit()?;
        Ok(removed)
    }
}

fn select_by_name(conn: &Connection, name: &str) -> RepoResult<Option<Location>> {
    let mut stmt = conn.prepare(&format!("{LOCATION_SELECT_SQL} WHERE name = ?1;"))?;
    let row = stmt.query_row([name], LocationRow::read).optional()?;
    row.map(LocationRow::into_location).transpose()
}

fn insert_row(conn: &Connection, location: &Location) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO locations (
            id,
            name,
            address,
            zip_code,
            state,
            city,
            country,
            lat,
            long
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            location.id.to_string(),
            location.name.as_str(),
            location.address.as_deref(),
            location.zip_code.as_deref(),
            location.state.as_deref(),
            location.city.as_deref(),
            location.country.as_deref(),
            location.lat,
            location.long,
        ],
    )
    .map_err(|err| map_unique_violation(err, "locations", "name"))?;
    Ok(())
}

fn update_row(conn: &Connection, location: &Location) -> RepoResult<()> {
    conn.execute(
        "UPDATE locations
         SET
            name = ?2,
            address = ?3,
            zip_code = ?4,
            state = ?5,
            city = ?6,
            country = ?7,
            lat = ?8,
            long = ?9
         WHERE id = ?1;",
        params![
            location.id.to_string(),
            location.name.as_str(),
            location.address.as_deref(),
            location.zip_code.as_deref(),
            location.state.as_deref(),
            location.city.as_deref(),
            location.country.as_deref(),
            location.lat,
            location.long,
        ],
    )
    .map_err(|err| map_unique_violation(err, "locations", "name"))?;
    Ok(())
}

/// Raw column values, decoded into a `Location` outside the row closure.
struct LocationRow {
    id: String,
    name: String,
    address: Option<String>,
    zip_code: Option<String>,
    state: Option<String>,
    city: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    long: Option<f64>,
}

impl LocationRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            address: row.get("address")?,
            zip_code: row.get("zip_code")?,
            state: row.get("state")?,
            city: row.get("city")?,
            country: row.get("country")?,
            lat: row.get("lat")?,
            long: row.get("long")?,
        })
    }

    fn into_location(self) -> RepoResult<Location> {
        let location = Location {
            id: parse_uuid(&self.id, "locations.id")?,
            name: self.name,
            address: self.address,
            zip_code: self.zip_code,
            state: self.state,
            city: self.city,
            country: self.country,
            lat: self.lat,
            long: self.long,
        };
        location.validate()?;
        Ok(location)
    }
}
