//! Fill-once schema cache
//!
//! One [`SchemaRegistry`] is created per process and shared through `Arc`.
//! Each model type is introspected at most once: the lookup and the
//! introspection run under the same lock, so threads racing to build the
//! first instance of a type cannot both hit the store, and nobody observes a
//! half-built entry. Entries are immutable once inserted.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::{ModelError, Result};
use crate::field::{FieldSet, TypedField};
use crate::schema::mapping::native_type_tag;
use crate::store::Store;

/// Explicit run-time token for a model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    table: &'static str,
}

impl ModelDescriptor {
    pub fn new<T: 'static>(table: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            table,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn table(&self) -> &'static str {
        self.table
    }
}

/// Introspected schema of one model type
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    table: String,
    field_template: FieldSet,
    primary_keys: Vec<String>,
}

impl SchemaEntry {
    pub fn new(table: impl Into<String>, field_template: FieldSet, primary_keys: Vec<String>) -> Self {
        Self {
            table: table.into(),
            field_template,
            primary_keys,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn field_template(&self) -> &FieldSet {
        &self.field_template
    }

    /// Primary-key columns in store-reported order
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// Fresh per-instance field set: the template's slots with no values
    pub fn instantiate(&self) -> FieldSet {
        self.field_template.blank()
    }
}

/// Discover the columns, their type tags and the primary key of `table`
///
/// # Errors
///
/// `StoreUnavailable` if the store cannot describe the table or reports no
/// columns for it.
pub fn introspect(table: &str, store: &dyn Store) -> Result<SchemaEntry> {
    let columns = store.columns(table)?;
    if columns.is_empty() {
        return Err(ModelError::StoreUnavailable {
            table: table.to_string(),
            message: "no columns reported; table missing or unreadable".to_string(),
        });
    }

    let mut fields = FieldSet::new();
    for column in &columns {
        fields.insert(TypedField::new(
            column.name.clone(),
            native_type_tag(&column.native_type),
        ));
    }

    let primary_keys = store.primary_keys(table)?;
    Ok(SchemaEntry::new(table, fields, primary_keys))
}

/// Process-wide cache of schema entries keyed by model type
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: Mutex<HashMap<TypeId, Arc<SchemaEntry>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `descriptor`, introspecting on first use
    ///
    /// A failed introspection caches nothing; the next call retries.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` from introspection.
    pub fn resolve(&self, descriptor: &ModelDescriptor, store: &dyn Store) -> Result<Arc<SchemaEntry>> {
        // Entries are only inserted whole, so a poisoned map is still consistent
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(&descriptor.type_id()) {
            tracing::debug!(
                model = descriptor.type_name(),
                table = descriptor.table(),
                "schema cache hit"
            );
            return Ok(entry.clone());
        }

        let entry = Arc::new(introspect(descriptor.table(), store)?);
        tracing::debug!(
            model = descriptor.type_name(),
            table = descriptor.table(),
            column_count = entry.field_template().len(),
            key_count = entry.primary_keys().len(),
            "schema introspected"
        );
        entries.insert(descriptor.type_id(), entry.clone());
        Ok(entry)
    }

    /// The cached entry, if the type has been introspected
    pub fn get(&self, descriptor: &ModelDescriptor) -> Option<Arc<SchemaEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&descriptor.type_id())
            .cloned()
    }

    pub fn is_populated(&self, descriptor: &ModelDescriptor) -> bool {
        self.get(descriptor).is_some()
    }

    /// Number of model types cached
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ColumnMeta, ResultSet};
    use crate::value::TypeTag;
    use std::cell::Cell as Counter;

    struct BikeStore {
        introspections: Counter<usize>,
        fail: bool,
    }

    impl BikeStore {
        fn new() -> Self {
            Self {
                introspections: Counter::new(0),
                fail: false,
            }
        }
    }

    impl Store for BikeStore {
        fn query(&self, _sql: &str) -> Result<ResultSet> {
            Ok(ResultSet::default())
        }

        fn execute(&self, _sql: &str) -> Result<usize> {
            Ok(0)
        }

        fn columns(&self, table: &str) -> Result<Vec<ColumnMeta>> {
            self.introspections.set(self.introspections.get() + 1);
            if self.fail {
                return Err(ModelError::StoreUnavailable {
                    table: table.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(vec![
                ColumnMeta {
                    name: "registration".to_string(),
                    native_type: "INTEGER".to_string(),
                },
                ColumnMeta {
                    name: "status".to_string(),
                    native_type: "VARCHAR(20)".to_string(),
                },
            ])
        }

        fn primary_keys(&self, _table: &str) -> Result<Vec<String>> {
            Ok(vec!["registration".to_string()])
        }
    }

    struct Bike;
    struct Member;

    #[test]
    fn test_introspection_runs_once_per_type() {
        let registry = SchemaRegistry::new();
        let store = BikeStore::new();
        let bikes = ModelDescriptor::new::<Bike>("bikes");

        let first = registry.resolve(&bikes, &store).unwrap();
        let second = registry.resolve(&bikes, &store).unwrap();

        assert_eq!(store.introspections.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.primary_keys(), ["registration".to_string()]);
        assert_eq!(
            first.field_template().get("status").unwrap().declared_type(),
            TypeTag::Text
        );
    }

    #[test]
    fn test_types_are_cached_independently() {
        let registry = SchemaRegistry::new();
        let store = BikeStore::new();

        registry
            .resolve(&ModelDescriptor::new::<Bike>("bikes"), &store)
            .unwrap();
        registry
            .resolve(&ModelDescriptor::new::<Member>("bikes"), &store)
            .unwrap();

        assert_eq!(store.introspections.get(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_failed_introspection_caches_nothing() {
        let registry = SchemaRegistry::new();
        let mut store = BikeStore::new();
        store.fail = true;
        let bikes = ModelDescriptor::new::<Bike>("bikes");

        let err = registry.resolve(&bikes, &store).unwrap_err();
        assert!(matches!(err, ModelError::StoreUnavailable { .. }));
        assert!(!registry.is_populated(&bikes));

        store.fail = false;
        registry.resolve(&bikes, &store).unwrap();
        assert!(registry.is_populated(&bikes));
        assert_eq!(store.introspections.get(), 2);
    }

    #[test]
    fn test_instantiate_hands_out_blank_slots() {
        let registry = SchemaRegistry::new();
        let store = BikeStore::new();
        let entry = registry
            .resolve(&ModelDescriptor::new::<Bike>("bikes"), &store)
            .unwrap();

        let fields = entry.instantiate();
        assert_eq!(fields.len(), 2);
        assert!(fields.all_absent());
        assert_eq!(
            fields.names().collect::<Vec<_>>(),
            vec!["registration", "status"]
        );
    }
}
