//! Per-thread handle bundling a store connection with the shared registry

#![allow(clippy::result_large_err)]

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use rowmodel_core::logging_facility;
use rowmodel_core::{Model, SchemaRegistry, Store};

use crate::config::StoreConfig;
use crate::entity::Entity;
use crate::errors::Result;
use crate::sqlite::SqliteStore;

/// What every entity is constructed from
///
/// Cloning is cheap and shares both the connection and the registry. The
/// connection is single-threaded; the registry may be shared with handles
/// on other threads.
#[derive(Clone)]
pub struct Database {
    store: Rc<dyn Store>,
    registry: Arc<SchemaRegistry>,
}

impl Database {
    pub fn new(store: impl Store + 'static, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            store: Rc::new(store),
            registry,
        }
    }

    /// Open the configured SQLite database and initialize logging
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the database cannot be opened or configured.
    pub fn open(config: &StoreConfig, registry: Arc<SchemaRegistry>) -> Result<Self> {
        logging_facility::init(config.logging.profile);
        Ok(Self::new(SqliteStore::from_config(config)?, registry))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Construct a blank entity of model `M`
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the model's table cannot be introspected.
    pub fn entity<M: Model>(&self) -> Result<Entity<M>> {
        Entity::new(self)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("cached_models", &self.registry.len())
            .finish_non_exhaustive()
    }
}
