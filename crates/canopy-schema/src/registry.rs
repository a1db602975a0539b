use std::collections::{BTreeMap, BTreeSet};

use crate::schema::ContentSchema;

/// Registry of content-type schemas, as populated by the hosting framework.
///
/// A type maps to every schema that can apply to it; shared behavior schemas
/// registered under several types are counted once when extracting index
/// fields.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    by_type: BTreeMap<String, Vec<ContentSchema>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under a content type.
    pub fn register(&mut self, type_name: impl Into<String>, schema: ContentSchema) {
        self.by_type.entry(type_name.into()).or_default().push(schema);
    }

    /// All registered content-type names.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    /// All distinct schemas across every type, deduplicated by schema name.
    pub fn distinct_schemas(&self) -> Vec<&ContentSchema> {
        let mut seen = BTreeSet::new();
        let mut schemas = Vec::new();
        for schema in self.by_type.values().flatten() {
            if seen.insert(schema.name.as_str()) {
                schemas.push(schema);
            }
        }
        schemas
    }

    /// The distinct indexable field names across all registered schemas,
    /// first-seen order, each resolved through its index directive.
    pub fn index_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for schema in self.distinct_schemas() {
            for field in schema.index_fields() {
                if !fields.iter().any(|f| f == field) {
                    fields.push(field.to_string());
                }
            }
        }
        fields
    }
}
