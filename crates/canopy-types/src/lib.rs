//! Foundation types for the Canopy storage adapter.
//!
//! Canopy persists a hierarchical content tree (resources plus annotation
//! sub-records) inside a schemaless document store, one document per record.
//! This crate defines the identifiers and the persisted record shape shared
//! by every other Canopy crate.
//!
//! # Key Types
//!
//! - [`Oid`] — opaque unique identifier of a persisted record (document key)
//! - [`Tid`] — transaction identifier stamped onto a record at write time
//! - [`ObjectRecord`] — the persisted document schema, including the base64
//!   text encoding of the opaque `state` blob

pub mod error;
pub mod ids;
pub mod record;

pub use error::RecordError;
pub use ids::{Oid, Tid, ROOT_OID};
pub use record::{decode_state, encode_state, ObjectRecord};
