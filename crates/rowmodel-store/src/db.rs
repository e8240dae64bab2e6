//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

#![allow(clippy::result_large_err)]

use crate::config::{DatabaseConfig, StoreConfig};
use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
///
/// # Errors
///
/// `StoreUnavailable` if SQLite cannot open the file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
///
/// # Errors
///
/// `StoreUnavailable` if SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Apply connection pragmas from configuration
///
/// # Errors
///
/// `StoreUnavailable` if a pragma is rejected.
pub fn configure(conn: &Connection, config: &DatabaseConfig) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", config.foreign_keys)
        .map_err(from_rusqlite)?;

    if let Some(mode) = &config.journal_mode {
        // journal_mode reports the resulting mode as a row
        let applied: String = conn
            .pragma_update_and_check(None, "journal_mode", mode, |row| row.get(0))
            .map_err(from_rusqlite)?;
        tracing::debug!(requested = %mode, applied = %applied, "journal mode set");
    }

    Ok(())
}

/// Open and configure a connection as described by `config`
///
/// An absent `database.path` opens an in-memory database.
///
/// # Errors
///
/// `StoreUnavailable` if the file cannot be opened or a pragma is rejected.
pub fn open_with(config: &StoreConfig) -> Result<Connection> {
    let conn = match &config.database.path {
        Some(path) => open(path)?,
        None => open_in_memory()?,
    };
    configure(&conn, &config.database)?;
    Ok(conn)
}
