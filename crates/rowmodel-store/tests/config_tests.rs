mod common;

use std::io::Write;
use std::sync::Arc;

use rowmodel_core::{ExErrorKind, SchemaRegistry, Value};
use rowmodel_store::{Database, Entity, StoreConfig};

use common::{Bike, BIKES_SCHEMA};

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[database]\npath = \"fleet.db\"\njournal_mode = \"WAL\"\n\n[logging]\nprofile = \"test\""
    )
    .unwrap();

    let config = StoreConfig::load(file.path()).unwrap();
    assert_eq!(
        config.database.path.as_deref(),
        Some(std::path::Path::new("fleet.db"))
    );
    assert_eq!(config.database.journal_mode.as_deref(), Some("WAL"));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = StoreConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Io);
}

#[test]
fn test_file_backed_database_persists_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::from_toml_str(&format!(
        "[database]\npath = \"{}\"\njournal_mode = \"wal\"\n\n[logging]\nprofile = \"test\"\n",
        dir.path().join("fleet.db").display()
    ))
    .unwrap();
    let registry = Arc::new(SchemaRegistry::new());

    // Given: a bike stored through one handle
    {
        let db = Database::open(&config, registry.clone()).unwrap();
        rusqlite::Connection::open(config.database.path.as_ref().unwrap())
            .unwrap()
            .execute_batch(BIKES_SCHEMA)
            .unwrap();

        let mut bike = Entity::<Bike>::new(&db).unwrap();
        bike.set_field("registration", 10)
            .unwrap()
            .set_field("status", "active")
            .unwrap();
        bike.store().unwrap();
    }

    // Then: a second handle on the same file sees it
    let db = Database::open(&config, registry).unwrap();
    let mut bike = Entity::<Bike>::new(&db).unwrap();
    bike.find(10).unwrap();
    assert_eq!(bike.get_field("status"), Some(&Value::from("active")));
}
