/// Request to create a secondary index over one field path.
///
/// `field_path` is either a top-level structural field (`parent_id`) or a
/// path inside the search projection (`json.title`). Indexes are created
/// once at bootstrap, checked for existence first, and never dropped by
/// this subsystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Index name, conventionally `{bucket}_object_{name}`.
    pub name: String,
    /// The indexed field path.
    pub field_path: String,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_path: field_path.into(),
        }
    }
}

/// An index installed on the bucket, as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    /// The indexed field path; `None` for the primary index.
    pub field_path: Option<String>,
    pub is_primary: bool,
}

impl IndexInfo {
    /// Describe the primary index.
    pub fn primary() -> Self {
        Self {
            name: "#primary".to_string(),
            field_path: None,
            is_primary: true,
        }
    }

    /// Describe a secondary index.
    pub fn secondary(name: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_path: Some(field_path.into()),
            is_primary: false,
        }
    }
}
