//! Shared fixtures for store integration tests

#![allow(dead_code)]

use std::sync::Arc;

use rowmodel_core::{Model, SchemaRegistry};
use rowmodel_store::{Database, SqliteStore};

pub const BIKES_SCHEMA: &str = "
    CREATE TABLE bikes (
        registration INTEGER PRIMARY KEY,
        status VARCHAR(20),
        remarks TEXT,
        location VARCHAR(40)
    );";

pub const RIDES_SCHEMA: &str = "
    CREATE TABLE rides (
        member_id INTEGER NOT NULL,
        started_at TIMESTAMP NOT NULL,
        fare DECIMAL(8, 2),
        PRIMARY KEY (member_id, started_at)
    );";

pub const SAMPLES_SCHEMA: &str = "
    CREATE TABLE samples (
        id INTEGER PRIMARY KEY,
        label VARCHAR(30),
        total BIGINT,
        price DECIMAL(10, 2),
        ratio REAL,
        weight DOUBLE,
        day DATE,
        seen_at TIMESTAMP,
        opens TIME,
        payload BLOB
    );";

pub const LOG_SCHEMA: &str = "CREATE TABLE log (message TEXT);";

pub struct Bike;
impl Model for Bike {
    const TABLE: &'static str = "bikes";
}

pub struct Ride;
impl Model for Ride {
    const TABLE: &'static str = "rides";
}

pub struct Sample;
impl Model for Sample {
    const TABLE: &'static str = "samples";
}

pub struct LogLine;
impl Model for LogLine {
    const TABLE: &'static str = "log";
}

/// In-memory database with `schema` applied and a fresh registry
pub fn setup_test_db(schema: &str) -> Database {
    let store = SqliteStore::open_in_memory().unwrap();
    store.connection().execute_batch(schema).unwrap();
    Database::new(store, Arc::new(SchemaRegistry::new()))
}
