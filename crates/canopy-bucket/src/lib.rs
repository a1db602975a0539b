//! The document-store boundary for Canopy.
//!
//! A bucket is a flat namespace of documents keyed by string, offering only
//! single-document operations (get, upsert, subdocument mutation, counter,
//! remove) plus filtered queries served by secondary indexes. There are no
//! multi-document transactions and no tree semantics — those are
//! reconstructed above this boundary by `canopy-store`.
//!
//! # Contents
//!
//! - [`DocumentBackend`] — the async trait every backend implements
//! - [`Query`]/[`Condition`] — the structured, parameterized query model
//! - [`SubdocOp`] — a single "set this field" partial-update operation,
//!   capped at [`MAX_SUBDOC_OPS`] per mutate-in call
//! - [`InMemoryBucket`] — `BTreeMap`-backed bucket for tests and embedding

pub mod error;
pub mod index;
pub mod memory;
pub mod query;
pub mod subdoc;
pub mod traits;

pub use error::{BucketError, BucketResult};
pub use index::{IndexDescriptor, IndexInfo};
pub use memory::InMemoryBucket;
pub use query::{Condition, Projection, Query};
pub use subdoc::{SubdocOp, MAX_SUBDOC_OPS};
pub use traits::{Document, DocumentBackend};
