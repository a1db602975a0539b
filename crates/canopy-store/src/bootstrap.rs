//! Idempotent index bootstrap.
//!
//! Runs once at storage initialization, before any traffic is trusted to use
//! indexed queries. Inspects what is installed, then creates the primary
//! index, one secondary index per fixed structural field, and one per
//! schema-derived indexable field under the `json` projection — skipping
//! anything already present. Any creation failure is fatal: a store with
//! missing indexes degrades every query to a full scan and must not be
//! served.

use std::collections::BTreeSet;

use tracing::{info, warn};

use canopy_bucket::{DocumentBackend, IndexDescriptor};
use canopy_schema::SchemaRegistry;

use crate::error::StoreResult;

/// The structural fields every record carries and every tree query filters
/// or stamps; each gets its own secondary index.
pub(crate) const STRUCTURAL_INDEX_FIELDS: [&str; 9] = [
    "zoid",
    "id",
    "part",
    "resource",
    "of",
    "parent_id",
    "type",
    "otid",
    "tid",
];

pub(crate) async fn bootstrap_indexes(
    backend: &dyn DocumentBackend,
    registry: &SchemaRegistry,
) -> StoreResult<()> {
    let bucket = backend.bucket_name();
    let installed = backend.list_indexes().await?;
    let primary_installed = installed.iter().any(|index| index.is_primary);
    let installed_fields: BTreeSet<&str> = installed
        .iter()
        .filter_map(|index| index.field_path.as_deref())
        .collect();

    if installed_fields.is_empty() {
        info!(bucket, "initializing bucket, this can take some time");
    }

    if !primary_installed {
        warn!(bucket, "creating primary index");
        backend.create_primary_index().await?;
    }

    for field in STRUCTURAL_INDEX_FIELDS {
        if installed_fields.contains(field) {
            continue;
        }
        let descriptor = IndexDescriptor::new(format!("{bucket}_object_{field}"), field);
        warn!(index = %descriptor.name, field, "creating index");
        backend.create_index(&descriptor).await?;
    }

    for field in registry.index_fields() {
        let path = format!("json.{field}");
        if installed_fields.contains(path.as_str()) {
            continue;
        }
        let descriptor = IndexDescriptor::new(format!("{bucket}_object_json_{field}"), path);
        warn!(index = %descriptor.name, "creating index");
        backend.create_index(&descriptor).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_bucket::InMemoryBucket;
    use canopy_schema::ContentSchema;

    fn registry_with_fields() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(
            "Document",
            ContentSchema::new("IDocument")
                .with_indexed_field("title")
                .with_indexed_field("text"),
        );
        registry
    }

    #[tokio::test]
    async fn fresh_bucket_gets_full_bootstrap() {
        let bucket = InMemoryBucket::new("db");
        let registry = registry_with_fields();

        bootstrap_indexes(&bucket, &registry).await.unwrap();

        // One primary, nine structural, two schema-derived.
        assert_eq!(bucket.index_create_count(), 1 + 9 + 2);

        let indexes = bucket.list_indexes().await.unwrap();
        assert!(indexes.iter().any(|i| i.is_primary));
        assert!(indexes
            .iter()
            .any(|i| i.name == "db_object_parent_id"
                && i.field_path.as_deref() == Some("parent_id")));
        assert!(indexes
            .iter()
            .any(|i| i.name == "db_object_json_title"
                && i.field_path.as_deref() == Some("json.title")));
    }

    #[tokio::test]
    async fn second_bootstrap_is_a_no_op() {
        let bucket = InMemoryBucket::new("db");
        let registry = registry_with_fields();

        bootstrap_indexes(&bucket, &registry).await.unwrap();
        let created = bucket.index_create_count();

        bootstrap_indexes(&bucket, &registry).await.unwrap();
        assert_eq!(bucket.index_create_count(), created);
    }

    #[tokio::test]
    async fn missing_primary_is_created_without_duplicating_secondaries() {
        let bucket = InMemoryBucket::new("db");
        let registry = SchemaRegistry::new();

        bootstrap_indexes(&bucket, &registry).await.unwrap();
        assert_eq!(bucket.index_create_count(), 1 + 9);

        // Rerun against the fully-indexed bucket: nothing new.
        bootstrap_indexes(&bucket, &registry).await.unwrap();
        assert_eq!(bucket.index_create_count(), 1 + 9);
    }

    #[tokio::test]
    async fn empty_registry_creates_no_json_indexes() {
        let bucket = InMemoryBucket::new("db");
        bootstrap_indexes(&bucket, &SchemaRegistry::new())
            .await
            .unwrap();
        let indexes = bucket.list_indexes().await.unwrap();
        assert!(!indexes
            .iter()
            .any(|i| i.field_path.as_deref().is_some_and(|f| f.starts_with("json."))));
    }
}
