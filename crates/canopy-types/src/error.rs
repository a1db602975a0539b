use thiserror::Error;

/// Errors produced while encoding or decoding persisted records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The `state` field does not hold valid base64 text.
    #[error("invalid state encoding: {0}")]
    InvalidStateEncoding(String),

    /// The document is missing required fields or has wrong field types.
    #[error("malformed record document: {0}")]
    Malformed(String),
}
