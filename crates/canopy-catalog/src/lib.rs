//! Post-commit search-index maintenance.
//!
//! After a unit of work commits, the hosting framework hands the changed
//! search-relevant field values to the [`CatalogIndexer`], which pushes them
//! into the stored documents as partial updates — never touching `state`,
//! `tid`, or the structural fields. The underlying mutate-in primitive
//! accepts at most 16 field operations per call, so updates are flushed in
//! groups of that size.

pub mod indexer;

pub use indexer::CatalogIndexer;
