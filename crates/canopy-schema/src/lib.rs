//! Content-type schemas and their index directives.
//!
//! The hosting framework registers one or more schemas per content type.
//! Schema fields may carry an index directive marking them as indexable in
//! the search projection (`json.*` paths). At storage bootstrap the set of
//! all distinct indexable field names across every registered schema drives
//! the creation of the schema-derived secondary indexes.

pub mod registry;
pub mod schema;

pub use registry::SchemaRegistry;
pub use schema::{ContentSchema, FieldSchema, IndexDirective};
