use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::BucketResult;
use crate::index::{IndexDescriptor, IndexInfo};
use crate::query::{Condition, Query};
use crate::subdoc::SubdocOp;

/// A stored document: a flat JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Async boundary to the document store.
///
/// All implementations must satisfy these invariants:
/// - Every operation touches at most one document; there are no
///   multi-document transactions at this level.
/// - `remove` is idempotent: removing an absent document succeeds.
/// - `mutate_in` requires the document to exist and accepts at most
///   [`MAX_SUBDOC_OPS`](crate::MAX_SUBDOC_OPS) operations per call.
/// - Queries see committed document state at query time; no cross-query
///   consistency is guaranteed.
/// - Connectivity failures are propagated, never retried internally.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// The bucket (namespace) this backend is connected to.
    fn bucket_name(&self) -> &str;

    /// Fetch a document by key. Returns `Ok(None)` when absent.
    async fn get(&self, key: &str) -> BucketResult<Option<Document>>;

    /// Insert or fully replace a document.
    async fn upsert(&self, key: &str, document: Document) -> BucketResult<()>;

    /// Apply subdocument operations to an existing document.
    async fn mutate_in(&self, key: &str, ops: &[SubdocOp]) -> BucketResult<()>;

    /// Atomically add `delta` to a counter document, creating it with
    /// `initial` when absent. Returns the resulting value.
    async fn counter(&self, key: &str, delta: i64, initial: u64) -> BucketResult<u64>;

    /// Remove a document. Succeeds even when the document is absent.
    async fn remove(&self, key: &str) -> BucketResult<()>;

    /// Run a filtered, projected query over the bucket.
    async fn query(&self, query: &Query) -> BucketResult<Vec<Document>>;

    /// Count the documents matching a conjunction of conditions.
    async fn count(&self, filter: &[Condition]) -> BucketResult<u64>;

    /// List all indexes installed on this bucket.
    async fn list_indexes(&self) -> BucketResult<Vec<IndexInfo>>;

    /// Create the primary index.
    async fn create_primary_index(&self) -> BucketResult<()>;

    /// Create a secondary index.
    async fn create_index(&self, descriptor: &IndexDescriptor) -> BucketResult<()>;
}
