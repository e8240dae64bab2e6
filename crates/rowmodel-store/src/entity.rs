//! Active-record façade
//!
//! An [`Entity`] is one row of a model's table held in memory: a typed field
//! set built from the cached schema, plus a query builder for the next
//! statement. Reads materialize rows into fields; writes serialize fields
//! into mutations.
//!
//! ## Lifecycle logging
//!
//! `find`, `find_by`, `get`, `store`, `update` and `delete` each emit one
//! start event and one end or end_error event. Query rendering and the SQLite
//! adapter only log at debug level underneath.

#![allow(clippy::result_large_err)]

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use rowmodel_core::{log_op_end, log_op_error, log_op_start};
use rowmodel_core::{
    FieldSet, Model, ModelError, Predicate, QueryBuilder, SchemaEntry, TypedField, Value,
};

use crate::database::Database;
use crate::errors::Result;

/// In-memory row of model `M`
pub struct Entity<M: Model> {
    db: Database,
    schema: Arc<SchemaEntry>,
    fields: FieldSet,
    query: QueryBuilder,
    _model: PhantomData<M>,
}

/// Construct a blank entity of any model type
///
/// # Errors
///
/// `StoreUnavailable` if the model's table cannot be introspected.
pub fn construct<M: Model>(db: &Database) -> Result<Entity<M>> {
    Entity::new(db)
}

impl<M: Model> Entity<M> {
    /// Resolve the model's schema (introspecting on first use) and build a
    /// blank instance
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the table cannot be described.
    pub fn new(db: &Database) -> Result<Self> {
        let schema = db.registry().resolve(&M::descriptor(), db.store())?;
        Ok(Self::with_schema(db.clone(), schema))
    }

    fn with_schema(db: Database, schema: Arc<SchemaEntry>) -> Self {
        Self {
            db,
            fields: schema.instantiate(),
            query: QueryBuilder::new(M::TABLE),
            schema,
            _model: PhantomData,
        }
    }

    /// Blank instance sharing this one's connection and schema
    fn sibling(&self) -> Self {
        Self::with_schema(self.db.clone(), self.schema.clone())
    }

    pub fn table(&self) -> &str {
        M::TABLE
    }

    pub fn primary_keys(&self) -> &[String] {
        self.schema.primary_keys()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.names()
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The pending statement
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    /// True iff every field is absent
    pub fn is_empty(&self) -> bool {
        self.fields.all_absent()
    }

    // ===== Field access =====

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(TypedField::value)
    }

    /// Assign a field
    ///
    /// # Errors
    ///
    /// `FieldNotFound` for a column outside the schema, `TypeMismatch` if the
    /// value does not fit the column's declared type.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.assign(name, Some(value.into()))?;
        Ok(self)
    }

    /// Clear a field so it is written as NULL
    ///
    /// # Errors
    ///
    /// `FieldNotFound` for a column outside the schema.
    pub fn set_null(&mut self, name: &str) -> Result<&mut Self> {
        self.assign(name, None)?;
        Ok(self)
    }

    fn assign(&mut self, name: &str, value: Option<Value>) -> Result<()> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| ModelError::FieldNotFound {
                table: M::TABLE.to_string(),
                field: name.to_string(),
            })?;
        field.assign(value)?;
        Ok(())
    }

    /// Current values of the primary-key columns, in key order
    pub fn primary_key_values(&self) -> Vec<Option<Value>> {
        self.schema
            .primary_keys()
            .iter()
            .map(|key| self.get_field(key).cloned())
            .collect()
    }

    // ===== Builder passthrough =====

    /// # Errors
    ///
    /// `InvalidQueryState` while a write is pending.
    pub fn select_all(&mut self) -> Result<&mut Self> {
        self.query.select_all()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// `InvalidQueryState` while a write is pending.
    pub fn select(&mut self, column: impl Into<String>) -> Result<&mut Self> {
        self.query.select(column)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// `InvalidQueryState` while a write is pending.
    pub fn select_many<I, S>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.select_many(columns)?;
        Ok(self)
    }

    pub fn filter(&mut self, predicate: Predicate) -> &mut Self {
        self.query.filter(predicate);
        self
    }

    pub fn filter_many<I>(&mut self, predicates: I) -> &mut Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        self.query.filter_many(predicates);
        self
    }

    pub fn filter_eq(&mut self, column: impl Into<String>, literal: impl Into<String>) -> &mut Self {
        self.query.filter_eq(column, literal);
        self
    }

    /// Run whatever statement the builder holds as a write
    ///
    /// # Errors
    ///
    /// `QueryExecutionFailed` from the store.
    pub fn execute(&mut self) -> Result<usize> {
        Ok(self.query.execute(self.db.store())?)
    }

    // ===== Lifecycle =====

    /// Load the row whose first primary-key column equals `key`
    ///
    /// The whole row is loaded even if a narrower selection is pending; pending
    /// filters still apply. On a miss every field is left absent; check
    /// [`Entity::is_empty`].
    ///
    /// # Errors
    ///
    /// `NoPrimaryKey` if the table declares none, `InvalidQueryState` while
    /// a write is pending, `QueryExecutionFailed` from the store.
    pub fn find(&mut self, key: impl Into<Value>) -> Result<&mut Self> {
        let key = key.into();
        self.instrumented("entity_find", |entity| {
            let column = entity
                .primary_keys()
                .first()
                .cloned()
                .ok_or_else(|| ModelError::NoPrimaryKey {
                    table: M::TABLE.to_string(),
                })?;
            entity.load_where([Predicate::eq(column, key.to_literal())])
        })?;
        Ok(self)
    }

    /// Load the row matching every `(column, value)` pair
    ///
    /// Predicates are rendered in iteration order.
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` while a write is pending, `QueryExecutionFailed`
    /// from the store.
    pub fn find_by<I, K, V>(&mut self, keys: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let predicates: Vec<Predicate> = keys
            .into_iter()
            .map(|(column, value)| {
                let value: Value = value.into();
                Predicate::eq(column, value.to_literal())
            })
            .collect();
        self.instrumented("entity_find_by", |entity| entity.load_where(predicates))?;
        Ok(self)
    }

    fn load_where(&mut self, predicates: impl IntoIterator<Item = Predicate>) -> Result<()> {
        self.fields.clear_values();
        self.query.select_all()?.filter_many(predicates);
        let result = self.query.get(self.db.store())?;
        if let Some(row) = result.rows.first() {
            self.fields.fill(row);
        }
        Ok(())
    }

    /// Run the pending SELECT and materialize every returned row
    ///
    /// Primary-key columns are always added to the projection. The first row
    /// is loaded into `self`; the returned list starts with a copy of it,
    /// followed by one new instance per further row.
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` while a write is pending, `QueryExecutionFailed`
    /// from the store.
    pub fn get(&mut self) -> Result<Vec<Self>> {
        self.instrumented("entity_get", |entity| {
            entity.fields.clear_values();

            let keys = entity.schema.primary_keys().to_vec();
            if keys.is_empty() {
                if entity.query.selections().is_empty() {
                    entity.query.select_all()?;
                }
            } else {
                entity.query.select_many(keys)?;
            }

            let result = entity.query.get(entity.db.store())?;
            let mut rows = result.rows.iter();
            let mut loaded = Vec::with_capacity(result.len());
            if let Some(first) = rows.next() {
                entity.fields.fill(first);
                loaded.push(entity.clone());
            }
            for row in rows {
                let mut sibling = entity.sibling();
                sibling.fields.fill(row);
                loaded.push(sibling);
            }
            Ok(loaded)
        })
    }

    /// Insert every field as a new row
    ///
    /// Returns the primary-key values as held in memory, in key order.
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` if a SELECT or DELETE is pending,
    /// `QueryExecutionFailed` from the store.
    pub fn store(&mut self) -> Result<Vec<Option<Value>>> {
        self.instrumented("entity_store", |entity| {
            entity.query.insert_all(entity.fields.to_mutations())?;
            entity.query.execute(entity.db.store())?;
            Ok(entity.primary_key_values())
        })
    }

    /// Write every field to the row addressed by the current key values
    ///
    /// # Errors
    ///
    /// `NoPrimaryKey` if the table declares none, `PrimaryKeyUnset` if a key
    /// field is absent, `InvalidQueryState` if a SELECT or DELETE is pending,
    /// `QueryExecutionFailed` from the store.
    pub fn update(&mut self) -> Result<usize> {
        self.instrumented("entity_update", |entity| {
            let predicates = entity.key_predicates()?;
            entity
                .query
                .update_all(entity.fields.to_mutations())?
                .filter_many(predicates);
            Ok(entity.query.execute(entity.db.store())?)
        })
    }

    fn key_predicates(&self) -> Result<Vec<Predicate>> {
        let keys = self.schema.primary_keys();
        if keys.is_empty() {
            return Err(ModelError::NoPrimaryKey {
                table: M::TABLE.to_string(),
            }
            .into());
        }
        keys.iter()
            .map(|key| {
                self.get_field(key)
                    .map(|value| Predicate::eq(key.clone(), value.to_literal()))
                    .ok_or_else(|| {
                        ModelError::PrimaryKeyUnset {
                            table: M::TABLE.to_string(),
                            column: key.clone(),
                        }
                        .into()
                    })
            })
            .collect()
    }

    /// Delete the rows matched by the pending filters
    ///
    /// Without filters every row of the table is deleted.
    ///
    /// # Errors
    ///
    /// `InvalidQueryState` if another statement kind is pending,
    /// `QueryExecutionFailed` from the store.
    pub fn delete(&mut self) -> Result<usize> {
        self.instrumented("entity_delete", |entity| {
            entity.query.delete()?;
            Ok(entity.query.execute(entity.db.store())?)
        })
    }

    fn instrumented<T>(
        &mut self,
        op: &'static str,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        log_op_start!(op, table = M::TABLE);

        let result = body(self);

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => {
                log_op_end!(op, duration_ms = duration_ms, table = M::TABLE);
            }
            Err(e) => {
                log_op_error!(op, e.clone(), duration_ms = duration_ms, table = M::TABLE);
            }
        }
        result
    }
}

impl<M: Model> Clone for Entity<M> {
    /// Copies the field values; the pending statement is not carried over
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            schema: self.schema.clone(),
            fields: self.fields.clone(),
            query: QueryBuilder::new(M::TABLE),
            _model: PhantomData,
        }
    }
}

impl<M: Model> PartialEq for Entity<M> {
    fn eq(&self, other: &Self) -> bool {
        self.table() == other.table()
            && self.fields == other.fields
            && self.primary_keys() == other.primary_keys()
    }
}

impl<M: Model> fmt::Display for Entity<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            match field.value() {
                Some(value) => write!(f, "{} = {}", field.name(), value)?,
                None => write!(f, "{} = NULL", field.name())?,
            }
        }
        Ok(())
    }
}

impl<M: Model> fmt::Debug for Entity<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("table", &M::TABLE)
            .field("fields", &self.fields)
            .field("query", &self.query)
            .finish()
    }
}
