use canopy_types::Oid;

/// Errors from storage adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record exists under the given oid. Callers treat this as "object
    /// does not exist", never as a systemic failure.
    #[error("object not found: {0}")]
    NotFound(Oid),

    /// The operation is not implemented by this adapter (blob storage).
    /// Callers must not retry.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Failure from the document-store backend; propagated as-is, no
    /// internal retry policy.
    #[error("bucket error: {0}")]
    Bucket(#[from] canopy_bucket::BucketError),

    /// A stored document could not be decoded into a record.
    #[error("record error: {0}")]
    Record(#[from] canopy_types::RecordError),

    /// The collaborator serialization layer failed to produce state or the
    /// search projection.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
