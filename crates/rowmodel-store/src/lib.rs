//! rowmodel store - SQLite persistence and the active-record façade
//!
//! Provides:
//! - A rusqlite binding of the core `Store` boundary
//! - Connection management and TOML configuration
//! - The `Database` handle (connection + shared schema registry)
//! - `Entity<M>`, the active record for a `Model` type

pub mod config;
pub mod database;
pub mod db;
pub mod entity;
pub mod errors;
pub mod sqlite;

// Re-export key types
pub use config::StoreConfig;
pub use database::Database;
pub use entity::{construct, Entity};
pub use errors::Result;
pub use sqlite::SqliteStore;
