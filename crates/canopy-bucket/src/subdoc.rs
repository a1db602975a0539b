use serde_json::Value;

/// Maximum number of subdocument operations one mutate-in call may carry.
pub const MAX_SUBDOC_OPS: usize = 16;

/// A single subdocument operation: set the field at `path` to `value`,
/// creating it if absent. Dotted paths address nested fields
/// (e.g. `json.title`).
#[derive(Clone, Debug, PartialEq)]
pub struct SubdocOp {
    pub path: String,
    pub value: Value,
}

impl SubdocOp {
    /// Build an upsert operation for a field path.
    pub fn upsert(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}
