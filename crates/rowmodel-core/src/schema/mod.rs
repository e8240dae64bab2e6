//! Schema introspection and caching
//!
//! - `mapping`: native column type → [`TypeTag`](crate::value::TypeTag), and
//!   type tag → row extractor
//! - `registry`: process-wide, fill-once cache of introspected schemas

pub mod mapping;
pub mod registry;

pub use mapping::{extractor, native_type_tag, Extractor};
pub use registry::{introspect, ModelDescriptor, SchemaEntry, SchemaRegistry};
