use thiserror::Error;

use crate::subdoc::MAX_SUBDOC_OPS;

/// Errors from bucket operations.
#[derive(Debug, Error)]
pub enum BucketError {
    /// The target document does not exist (get misses return `Ok(None)`;
    /// this is for operations that require the document to be present,
    /// such as subdocument mutation).
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// A mutate-in call carried more operations than the backend allows.
    #[error("too many subdocument operations: {count} (limit {MAX_SUBDOC_OPS})")]
    TooManySubdocOps { count: usize },

    /// Index creation or inspection failed.
    #[error("index operation failed: {0}")]
    Index(String),

    /// Connectivity or driver failure from the underlying store.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result alias for bucket operations.
pub type BucketResult<T> = Result<T, BucketError>;
