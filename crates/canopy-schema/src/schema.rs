use serde::{Deserialize, Serialize};

/// Field-level directive marking a field as indexable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDirective {
    /// Name of the index to create for this field. Defaults to the field's
    /// own name when not given.
    pub index_name: Option<String>,
}

/// A single field within a content-type schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    /// Present when the field participates in the search projection.
    pub index: Option<IndexDirective>,
}

/// A content-type schema: a named set of fields, some of them indexable.
///
/// A content type may be described by several schemas (its own plus shared
/// behavior schemas), and the same behavior schema may be attached to many
/// types. Schemas are identified by name for deduplication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl ContentSchema {
    /// Create an empty schema with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a plain (non-indexed) field.
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldSchema {
            name: name.into(),
            index: None,
        });
        self
    }

    /// Add an indexable field whose index name defaults to the field name.
    pub fn with_indexed_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldSchema {
            name: name.into(),
            index: Some(IndexDirective::default()),
        });
        self
    }

    /// Add an indexable field with an explicit index name.
    pub fn with_indexed_field_as(
        mut self,
        name: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSchema {
            name: name.into(),
            index: Some(IndexDirective {
                index_name: Some(index_name.into()),
            }),
        });
        self
    }

    /// The resolved index names of this schema's indexable fields, in
    /// declaration order.
    pub fn index_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|field| {
            let directive = field.index.as_ref()?;
            Some(
                directive
                    .index_name
                    .as_deref()
                    .unwrap_or(field.name.as_str()),
            )
        })
    }
}
