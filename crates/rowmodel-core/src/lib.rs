//! rowmodel core - store-agnostic persistence engine
//!
//! This crate provides the pieces an active-record entity is assembled from:
//! - Run-time value model with a closed set of type tags
//! - Typed field slots and the ordered field set backing one record
//! - WHERE-clause predicates and the one-shot query builder state machine
//! - The `Store` boundary trait and its tabular result types
//! - Native-type and row-extractor dispatch tables
//! - A fill-once schema registry keyed by model type
//!
//! The SQLite binding and the `Entity` façade live in `rowmodel-store`.

pub mod errors;
pub mod field;
pub mod logging_facility;
pub mod model;
pub mod predicate;
pub mod query;
pub mod schema;
pub mod store;
pub mod value;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, ModelError, Result};
pub use field::{FieldSet, TypedField, NULL_LITERAL};
pub use model::Model;
pub use predicate::{Operator, Predicate};
pub use query::{QueryBuilder, QueryMode, ALL_COLUMNS};
pub use schema::{ModelDescriptor, SchemaEntry, SchemaRegistry};
pub use store::{Cell, ColumnMeta, ResultSet, Row, Store, DEFAULT_WHERE_SEPARATOR};
pub use value::{TypeTag, Value};
