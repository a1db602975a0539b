//! The Canopy storage adapter.
//!
//! Makes a schemaless document store — single-document operations plus a
//! secondary-index query language, no native transactions, no tree queries —
//! behave like a transactional object-database backend for a hierarchical,
//! versioned content tree with annotations.
//!
//! # Components
//!
//! - [`Storage`] — the adapter facade: store/load/delete, tree navigation
//!   queries, index bootstrap, commit/abort
//! - [`TidSequencer`] — per-transaction id assignment, counter or random
//!   strategy selected by [`StorageConfig`]
//! - [`Transaction`] / [`PendingIndexContext`] — the unit of work and its
//!   precomputed search-projection side channel
//! - [`RecordWriter`] / [`RecordState`] — the collaborator contract the
//!   object-serialization layer must provide
//!
//! # What this adapter does NOT do
//!
//! There are no ACID multi-object transactions: concurrent writers to the
//! same oid both succeed and the last document write wins. The `otid`/`tid`
//! version markers are populated on every write but never compared —
//! [`Storage::get_conflicts`] always reports no conflicts. Aborting a
//! transaction discards only its local state; documents already written
//! stay written.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod sequencer;
pub mod storage;
pub mod txn;
pub mod writer;

pub use config::StorageConfig;
pub use error::{StoreError, StoreResult};
pub use sequencer::{TidSequencer, TidStrategy};
pub use storage::{AnnotationKey, Storage};
pub use txn::{PendingIndexContext, Transaction};
pub use writer::{RecordState, RecordWriter};
