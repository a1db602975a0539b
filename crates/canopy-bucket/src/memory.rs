use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{BucketError, BucketResult};
use crate::index::{IndexDescriptor, IndexInfo};
use crate::query::{Condition, Projection, Query};
use crate::subdoc::{SubdocOp, MAX_SUBDOC_OPS};
use crate::traits::{Document, DocumentBackend};

/// In-memory, `BTreeMap`-based bucket.
///
/// Intended for tests and embedding. Documents are held in memory behind a
/// `RwLock` and cloned on read/write. Iteration order is document-key order,
/// so query results are deterministic. Counters and indexes are tracked in
/// side maps; the number of index-creation and mutate-in calls is counted
/// so tests can assert on call batching and bootstrap idempotence.
pub struct InMemoryBucket {
    name: String,
    documents: RwLock<BTreeMap<String, Document>>,
    counters: RwLock<HashMap<String, u64>>,
    indexes: RwLock<Vec<IndexInfo>>,
    index_creates: AtomicUsize,
    mutate_calls: AtomicUsize,
}

impl InMemoryBucket {
    /// Create an empty bucket with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(BTreeMap::new()),
            counters: RwLock::new(HashMap::new()),
            indexes: RwLock::new(Vec::new()),
            index_creates: AtomicUsize::new(0),
            mutate_calls: AtomicUsize::new(0),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the bucket holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// How many create-index calls (primary or secondary) were issued.
    pub fn index_create_count(&self) -> usize {
        self.index_creates.load(Ordering::Relaxed)
    }

    /// How many mutate-in calls were issued.
    pub fn mutate_in_call_count(&self) -> usize {
        self.mutate_calls.load(Ordering::Relaxed)
    }

    /// Snapshot a stored document, for test assertions.
    pub fn document(&self, key: &str) -> Option<Document> {
        self.documents
            .read()
            .expect("lock poisoned")
            .get(key)
            .cloned()
    }

    fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
        let mut current: &Value = doc.get(path.split('.').next()?)?;
        for segment in path.split('.').skip(1) {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    fn matches(doc: &Document, filter: &[Condition]) -> bool {
        filter.iter().all(|condition| match condition {
            Condition::Eq { field, value } => Self::lookup(doc, field) == Some(value),
            Condition::In { field, values } => {
                Self::lookup(doc, field).is_some_and(|v| values.contains(v))
            }
        })
    }

    fn project(doc: &Document, projection: &Projection) -> Document {
        match projection {
            Projection::All => doc.clone(),
            Projection::Fields(fields) => {
                let mut out = Map::new();
                for field in fields {
                    if let Some(value) = doc.get(field) {
                        out.insert(field.clone(), value.clone());
                    }
                }
                out
            }
        }
    }

    fn set_path(doc: &mut Document, path: &str, value: Value) {
        let mut segments = path.split('.').peekable();
        let mut current = doc;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value);
                return;
            }
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry.as_object_mut().expect("just ensured object");
        }
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBucket {
    fn bucket_name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> BucketResult<Option<Document>> {
        let docs = self.documents.read().expect("lock poisoned");
        Ok(docs.get(key).cloned())
    }

    async fn upsert(&self, key: &str, document: Document) -> BucketResult<()> {
        let mut docs = self.documents.write().expect("lock poisoned");
        docs.insert(key.to_string(), document);
        Ok(())
    }

    async fn mutate_in(&self, key: &str, ops: &[SubdocOp]) -> BucketResult<()> {
        if ops.len() > MAX_SUBDOC_OPS {
            return Err(BucketError::TooManySubdocOps { count: ops.len() });
        }
        self.mutate_calls.fetch_add(1, Ordering::Relaxed);
        let mut docs = self.documents.write().expect("lock poisoned");
        let doc = docs
            .get_mut(key)
            .ok_or_else(|| BucketError::DocumentNotFound(key.to_string()))?;
        for op in ops {
            Self::set_path(doc, &op.path, op.value.clone());
        }
        Ok(())
    }

    async fn counter(&self, key: &str, delta: i64, initial: u64) -> BucketResult<u64> {
        let mut counters = self.counters.write().expect("lock poisoned");
        let value = match counters.get_mut(key) {
            Some(value) => {
                *value = value.saturating_add_signed(delta);
                *value
            }
            None => {
                counters.insert(key.to_string(), initial);
                initial
            }
        };
        Ok(value)
    }

    async fn remove(&self, key: &str) -> BucketResult<()> {
        let mut docs = self.documents.write().expect("lock poisoned");
        docs.remove(key);
        Ok(())
    }

    async fn query(&self, query: &Query) -> BucketResult<Vec<Document>> {
        let docs = self.documents.read().expect("lock poisoned");
        let mut rows = Vec::new();
        for doc in docs.values() {
            if !Self::matches(doc, &query.filter) {
                continue;
            }
            rows.push(Self::project(doc, &query.projection));
            if query.limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
        }
        Ok(rows)
    }

    async fn count(&self, filter: &[Condition]) -> BucketResult<u64> {
        let docs = self.documents.read().expect("lock poisoned");
        Ok(docs.values().filter(|doc| Self::matches(doc, filter)).count() as u64)
    }

    async fn list_indexes(&self) -> BucketResult<Vec<IndexInfo>> {
        Ok(self.indexes.read().expect("lock poisoned").clone())
    }

    async fn create_primary_index(&self) -> BucketResult<()> {
        self.index_creates.fetch_add(1, Ordering::Relaxed);
        let mut indexes = self.indexes.write().expect("lock poisoned");
        indexes.push(IndexInfo::primary());
        Ok(())
    }

    async fn create_index(&self, descriptor: &IndexDescriptor) -> BucketResult<()> {
        self.index_creates.fetch_add(1, Ordering::Relaxed);
        let mut indexes = self.indexes.write().expect("lock poisoned");
        indexes.push(IndexInfo::secondary(
            descriptor.name.clone(),
            descriptor.field_path.clone(),
        ));
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBucket")
            .field("name", &self.name)
            .field("document_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(fields: &[(&str, Value)]) -> Document {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Key-value operations
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn upsert_and_get() {
        let bucket = InMemoryBucket::new("db");
        let d = doc(&[("id", "a".into()), ("tid", 1.into())]);
        bucket.upsert("k1", d.clone()).await.unwrap();
        assert_eq!(bucket.get("k1").await.unwrap(), Some(d));
        assert_eq!(bucket.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let bucket = InMemoryBucket::new("db");
        bucket.upsert("k1", doc(&[("id", "a".into())])).await.unwrap();
        bucket.remove("k1").await.unwrap();
        bucket.remove("k1").await.unwrap(); // second remove also succeeds
        assert!(bucket.is_empty());
    }

    // -----------------------------------------------------------------------
    // Subdocument mutation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn mutate_in_updates_named_fields_only() {
        let bucket = InMemoryBucket::new("db");
        bucket
            .upsert("k1", doc(&[("id", "a".into()), ("tid", 1.into())]))
            .await
            .unwrap();
        bucket
            .mutate_in("k1", &[SubdocOp::upsert("tid", 2)])
            .await
            .unwrap();

        let stored = bucket.document("k1").unwrap();
        assert_eq!(stored["tid"], Value::from(2));
        assert_eq!(stored["id"], Value::from("a"));
    }

    #[tokio::test]
    async fn mutate_in_dotted_path_creates_nested_field() {
        let bucket = InMemoryBucket::new("db");
        bucket.upsert("k1", doc(&[("id", "a".into())])).await.unwrap();
        bucket
            .mutate_in("k1", &[SubdocOp::upsert("json.title", "hello")])
            .await
            .unwrap();

        let stored = bucket.document("k1").unwrap();
        assert_eq!(stored["json"]["title"], Value::from("hello"));
    }

    #[tokio::test]
    async fn mutate_in_missing_document_fails() {
        let bucket = InMemoryBucket::new("db");
        let err = bucket
            .mutate_in("nope", &[SubdocOp::upsert("tid", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, BucketError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn mutate_in_enforces_op_limit() {
        let bucket = InMemoryBucket::new("db");
        bucket.upsert("k1", doc(&[])).await.unwrap();
        let ops: Vec<SubdocOp> = (0..17)
            .map(|i| SubdocOp::upsert(format!("f{i}"), i))
            .collect();
        let err = bucket.mutate_in("k1", &ops).await.unwrap_err();
        assert!(matches!(err, BucketError::TooManySubdocOps { count: 17 }));

        // Exactly 16 is fine.
        bucket.mutate_in("k1", &ops[..16]).await.unwrap();
    }

    // -----------------------------------------------------------------------
    // Counter
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn counter_initializes_then_increments() {
        let bucket = InMemoryBucket::new("db");
        assert_eq!(bucket.counter("c", 1, 1).await.unwrap(), 1);
        assert_eq!(bucket.counter("c", 1, 1).await.unwrap(), 2);
        assert_eq!(bucket.counter("c", 1, 1).await.unwrap(), 3);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn query_filters_and_projects() {
        let bucket = InMemoryBucket::new("db");
        bucket
            .upsert(
                "k1",
                doc(&[
                    ("zoid", "k1".into()),
                    ("parent_id", "root".into()),
                    ("id", "a".into()),
                ]),
            )
            .await
            .unwrap();
        bucket
            .upsert(
                "k2",
                doc(&[
                    ("zoid", "k2".into()),
                    ("parent_id", "other".into()),
                    ("id", "b".into()),
                ]),
            )
            .await
            .unwrap();

        let rows = bucket
            .query(&Query::select(["id"]).filter_eq("parent_id", "root"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], doc(&[("id", "a".into())]));
    }

    #[tokio::test]
    async fn query_in_condition_and_limit() {
        let bucket = InMemoryBucket::new("db");
        for (key, id) in [("k1", "a"), ("k2", "b"), ("k3", "c")] {
            bucket
                .upsert(key, doc(&[("zoid", key.into()), ("id", id.into())]))
                .await
                .unwrap();
        }

        let rows = bucket
            .query(&Query::all().filter_in("id", ["a", "c"]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let limited = bucket.query(&Query::all().limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn query_on_missing_field_matches_nothing() {
        let bucket = InMemoryBucket::new("db");
        bucket.upsert("k1", doc(&[("id", "a".into())])).await.unwrap();
        let rows = bucket
            .query(&Query::all().filter_eq("of", "owner"))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn count_matches_filter() {
        let bucket = InMemoryBucket::new("db");
        for key in ["k1", "k2", "k3"] {
            bucket
                .upsert(key, doc(&[("parent_id", "root".into())]))
                .await
                .unwrap();
        }
        bucket
            .upsert("k4", doc(&[("parent_id", "other".into())]))
            .await
            .unwrap();

        let filter = [Condition::Eq {
            field: "parent_id".into(),
            value: "root".into(),
        }];
        assert_eq!(bucket.count(&filter).await.unwrap(), 3);
        assert_eq!(bucket.count(&[]).await.unwrap(), 4);
    }

    // -----------------------------------------------------------------------
    // Index management
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn index_creation_is_recorded() {
        let bucket = InMemoryBucket::new("db");
        assert!(bucket.list_indexes().await.unwrap().is_empty());

        bucket.create_primary_index().await.unwrap();
        bucket
            .create_index(&IndexDescriptor::new("db_object_tid", "tid"))
            .await
            .unwrap();

        let indexes = bucket.list_indexes().await.unwrap();
        assert_eq!(indexes.len(), 2);
        assert!(indexes[0].is_primary);
        assert_eq!(indexes[1].field_path.as_deref(), Some("tid"));
        assert_eq!(bucket.index_create_count(), 2);
    }
}
