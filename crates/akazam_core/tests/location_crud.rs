use akazam_core::db::migrations::latest_version;
use akazam_core::db::open_db_in_memory;
use akazam_core::{
    normalize, AccessError, LocationData, LocationRepository, LocationService, RepoError,
    SqliteLocationRepository, UsAddressParser,
};
use rusqlite::Connection;

const CAMBRIDGE: &str = "124 North Throndike street, Cambridge MA 02141";

fn location_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM locations;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_then_get_matches_normalizer_output() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());

    service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();

    let loaded = service.get_location_from_name("Office").unwrap().unwrap();
    let expected = normalize(&UsAddressParser, CAMBRIDGE).unwrap();
    assert_eq!(loaded.address.as_deref(), Some("124 N Throndike St"));
    assert_eq!(loaded.address.as_deref(), Some(expected.address.as_str()));
    assert_eq!(loaded.city.as_deref(), Some("Cambridge"));
    assert_eq!(loaded.state.as_deref(), Some("MA"));
    assert_eq!(loaded.zip_code.as_deref(), Some("02141"));
}

#[test]
fn create_new_without_update_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    let data = LocationData {
        country: Some("USA".to_string()),
        ..LocationData::named("Office").with_address(CAMBRIDGE)
    };

    let first = service.create_new(&data, false).unwrap();
    let second = service.create_new(&data, false).unwrap();

    assert_eq!(first, second);
    assert_eq!(location_count(&conn), 1);
}

#[test]
fn create_new_returns_existing_snapshot_when_not_updating() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());

    let stored = service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();
    let returned = service
        .create_new(
            &LocationData::named("Office").with_address("9 Elm Rd, Springfield, IL"),
            false,
        )
        .unwrap();

    assert_eq!(returned, stored);
    assert_eq!(returned.city.as_deref(), Some("Cambridge"));
}

#[test]
fn create_new_with_update_overwrites_existing() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());

    let stored = service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();
    let updated = service
        .create_new(
            &LocationData::named("Office").with_address("9 Elm Rd, Springfield, IL 62701"),
            true,
        )
        .unwrap();

    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.address.as_deref(), Some("9 Elm Rd"));
    assert_eq!(updated.city.as_deref(), Some("Springfield"));
    assert_eq!(updated.zip_code.as_deref(), Some("62701"));
    assert_eq!(location_count(&conn), 1);
}

#[test]
fn create_new_keeps_unparseable_address_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());

    let data = LocationData {
        city: Some("Atlantis".to_string()),
        ..LocationData::named("Lost").with_address("somewhere under the sea")
    };
    let created = service.create_new(&data, false).unwrap();

    assert_eq!(created.address.as_deref(), Some("somewhere under the sea"));
    assert_eq!(created.city.as_deref(), Some("Atlantis"));
    assert_eq!(created.zip_code, None);
}

#[test]
fn create_new_without_name_is_insert_error() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());

    let err = service
        .create_new(&LocationData::default().with_address(CAMBRIDGE), false)
        .unwrap_err();
    assert_eq!(err, AccessError::Insert("location"));
    assert_eq!(err.to_string(), "cannot create new location");
    assert_eq!(location_count(&conn), 0);
}

#[test]
fn get_missing_is_none_and_blank_name_is_read_error() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());

    assert_eq!(service.get_location_from_name("Nowhere").unwrap(), None);
    assert_eq!(
        service.get_location_from_name("").unwrap_err(),
        AccessError::Read("location")
    );
}

#[test]
fn update_with_new_address_clears_stale_zip() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();

    let updated = service
        .update_location_by_name(
            "Office",
            &LocationData::default().with_address("9 Elm Rd, Springfield, IL"),
            false,
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.address.as_deref(), Some("9 Elm Rd"));
    assert_eq!(updated.city.as_deref(), Some("Springfield"));
    assert_eq!(updated.state.as_deref(), Some("IL"));
    assert_eq!(updated.zip_code.as_deref(), Some(""));

    let reloaded = service.get_location_from_name("Office").unwrap().unwrap();
    assert_eq!(reloaded.zip_code.as_deref(), Some(""));
}

#[test]
fn update_without_address_keeps_address_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();

    let patch = LocationData {
        lat: Some(42.3662),
        long: Some(-71.0784),
        ..LocationData::default()
    };
    let updated = service
        .update_location_by_name("Office", &patch, false)
        .unwrap()
        .unwrap();

    assert_eq!(updated.zip_code.as_deref(), Some("02141"));
    assert_eq!(updated.lat, Some(42.3662));
    assert_eq!(updated.long, Some(-71.0784));
}

#[test]
fn update_with_unparseable_address_leaves_derived_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();

    let updated = service
        .update_location_by_name(
            "Office",
            &LocationData::default().with_address("the old mill"),
            false,
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.address.as_deref(), Some("the old mill"));
    assert_eq!(updated.city.as_deref(), Some("Cambridge"));
    assert_eq!(updated.zip_code.as_deref(), Some("02141"));
}

#[test]
fn update_upserts_only_when_requested() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    let data = LocationData::default().with_address(CAMBRIDGE);

    let missing = service
        .update_location_by_name("missing", &data, false)
        .unwrap();
    assert_eq!(missing, None);
    assert_eq!(location_count(&conn), 0);

    let created = service
        .update_location_by_name("new-name", &data, true)
        .unwrap()
        .unwrap();
    assert_eq!(created.name, "new-name");
    assert_eq!(created.city.as_deref(), Some("Cambridge"));
    assert!(service.get_location_from_name("new-name").unwrap().is_some());
    assert_eq!(location_count(&conn), 1);
}

#[test]
fn update_can_rename_by_natural_key() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service
        .create_new(&LocationData::named("Office"), false)
        .unwrap();

    service
        .update_location_by_name("Office", &LocationData::named("HQ"), false)
        .unwrap()
        .unwrap();

    assert!(service.get_location_from_name("Office").unwrap().is_none());
    assert!(service.get_location_from_name("HQ").unwrap().is_some());
}

#[test]
fn update_rename_onto_taken_name_is_update_error() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service.create_new(&LocationData::named("A"), false).unwrap();
    service.create_new(&LocationData::named("B"), false).unwrap();

    let err = service
        .update_location_by_name("A", &LocationData::named("B"), false)
        .unwrap_err();
    assert_eq!(err, AccessError::Update("location"));
    assert!(service.get_location_from_name("A").unwrap().is_some());
}

#[test]
fn delete_reports_whether_location_existed() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service
        .create_new(&LocationData::named("Office"), false)
        .unwrap();

    assert!(service.delete_location_by_name("Office").unwrap());
    assert!(!service.delete_location_by_name("Office").unwrap());
    assert!(!service.delete_location_by_name("Nowhere").unwrap());
    assert_eq!(
        service.delete_location_by_name(" ").unwrap_err(),
        AccessError::Delete("location")
    );
}

#[test]
fn repository_rejects_duplicate_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocationRepository::try_new(&conn).unwrap();

    let first = akazam_core::Location::from_data(&LocationData::named("Office")).unwrap();
    let second = akazam_core::Location::from_data(&LocationData::named("Office")).unwrap();
    repo.save(&first).unwrap();

    let err = repo.save(&second).unwrap_err();
    assert!(matches!(
        err,
        RepoError::UniqueViolation {
            table: "locations",
            column: "name"
        }
    ));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteLocationRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE locations (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteLocationRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "locations",
            column: "address"
        })
    ));
}

#[test]
fn update_with_city_before_first_comma_keeps_city() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();

    let updated = service
        .update_location_by_name(
            "Office",
            &LocationData::default().with_address("1600 Amphitheatre Pkwy Mountain View, CA 94043"),
            false,
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.address.as_deref(), Some("1600 Amphitheatre Pkwy"));
    assert_eq!(updated.city.as_deref(), Some("Mountain View"));
    assert_eq!(updated.state.as_deref(), Some("CA"));
    assert_eq!(updated.zip_code.as_deref(), Some("94043"));
}

#[test]
fn update_with_bare_street_line_keeps_stored_locality() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());
    service
        .create_new(&LocationData::named("Office").with_address(CAMBRIDGE), false)
        .unwrap();

    for street in ["1100 Throndike street", "124 South Throndike street"] {
        let updated = service
            .update_location_by_name("Office", &LocationData::default().with_address(street), false)
            .unwrap()
            .unwrap();

        assert_eq!(updated.address.as_deref(), Some(street));
        assert_eq!(updated.city.as_deref(), Some("Cambridge"));
        assert_eq!(updated.state.as_deref(), Some("MA"));
        assert_eq!(updated.zip_code.as_deref(), Some("02141"));
    }
}

#[test]
fn create_with_bare_street_line_stores_it_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let service = LocationService::new(SqliteLocationRepository::try_new(&conn).unwrap());

    let created = service
        .create_new(&LocationData::named("Annex").with_address("10 Thorndike street"), false)
        .unwrap();

    assert_eq!(created.address.as_deref(), Some("10 Thorndike street"));
    assert_eq!(created.city, None);
}
