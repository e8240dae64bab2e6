//! TOML configuration for the SQLite store
//!
//! ```toml
//! [database]
//! path = "bikes.db"
//! foreign_keys = true
//! journal_mode = "WAL"
//!
//! [logging]
//! profile = "development"
//! ```
//!
//! Every key is optional. Without a `path` the database is in-memory.

#![allow(clippy::result_large_err)]

use rowmodel_core::logging_facility::Profile;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{config_error, io_error, Result};

/// Journal modes SQLite accepts for `PRAGMA journal_mode`
const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file; `None` opens an in-memory database
    pub path: Option<PathBuf>,
    pub foreign_keys: bool,
    /// Left at SQLite's default when unset
    pub journal_mode: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: true,
            journal_mode: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: Profile,
}

impl StoreConfig {
    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, unknown keys or an unsupported
    /// journal mode.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StoreConfig =
            toml::from_str(text).map_err(|e| config_error(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`StoreConfig::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| io_error("config_load", e))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if let Some(mode) = &self.database.journal_mode {
            if !JOURNAL_MODES.contains(&mode.to_ascii_uppercase().as_str()) {
                return Err(config_error(format!("Unsupported journal_mode: {}", mode)));
            }
        }
        Ok(())
    }
}
