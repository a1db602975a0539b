//! The storage adapter facade.
//!
//! One [`Storage`] wraps one connected bucket and serves every read and
//! write path of the hosting persistence framework: the object write path
//! (full upsert for new records, partial update for existing ones), key
//! loads, and the tree-shaped queries reconstructed from the flat document
//! collection via the structural fields every record carries.
//!
//! A single storage handle is shared across all concurrent transactions;
//! there is no cross-transaction locking. Two transactions writing the same
//! oid both succeed and the last document write wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use canopy_bucket::{Condition, DocumentBackend, Query, SubdocOp, MAX_SUBDOC_OPS};
use canopy_schema::SchemaRegistry;
use canopy_types::{encode_state, ObjectRecord, Oid, Tid};

use crate::bootstrap::bootstrap_indexes;
use crate::config::StorageConfig;
use crate::error::{StoreError, StoreResult};
use crate::sequencer::TidSequencer;
use crate::txn::Transaction;
use crate::writer::{RecordState, RecordWriter};

/// Fields selected when decoding child records from a tree query.
const RECORD_FIELDS: [&str; 7] = ["zoid", "tid", "size", "resource", "type", "state", "id"];

/// Fields selected for annotation lookups; adds the structural parent.
const ANNOTATION_FIELDS: [&str; 8] = [
    "zoid",
    "tid",
    "size",
    "resource",
    "type",
    "state",
    "id",
    "parent_id",
];

/// Status code returned by `store`. Always success: this adapter performs
/// no conflict detection at write time.
const STORE_STATUS_OK: i32 = 0;

/// An annotation's name and structural parent, as returned by
/// [`Storage::get_annotation_keys`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationKey {
    pub id: String,
    pub parent_id: Option<Oid>,
}

/// The storage adapter: a transactional-object-backend view over one bucket.
pub struct Storage {
    backend: Arc<dyn DocumentBackend>,
    registry: SchemaRegistry,
    config: StorageConfig,
    sequencer: TidSequencer,
    last_tid: RwLock<Option<Tid>>,
    initialized: AtomicBool,
}

impl Storage {
    /// Wrap an already-connected backend. Connection setup is owned by the
    /// caller and happens exactly once, before construction; call
    /// [`initialize`](Self::initialize) afterwards to bootstrap indexes.
    pub fn new(
        backend: Arc<dyn DocumentBackend>,
        registry: SchemaRegistry,
        config: StorageConfig,
    ) -> Self {
        let sequencer = TidSequencer::new(config.tid_strategy, Arc::clone(&backend));
        Self {
            backend,
            registry,
            config,
            sequencer,
            last_tid: RwLock::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// The underlying document backend.
    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Bootstrap the primary, structural, and schema-derived indexes.
    /// Idempotent: a second call is a no-op, and a fully-indexed bucket
    /// triggers zero creation calls. Must complete before concurrent
    /// traffic begins; any index-creation failure aborts initialization.
    pub async fn initialize(&self) -> StoreResult<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        bootstrap_indexes(self.backend.as_ref(), &self.registry).await?;
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------

    /// The transaction's id, assigned on first call and cached.
    pub async fn get_next_tid(&self, txn: &mut Transaction) -> StoreResult<Tid> {
        self.sequencer.next(txn).await
    }

    /// Commit: assigns (or returns) the transaction id and records it as
    /// the last committed transaction. Documents written during the
    /// transaction were already applied individually; there is nothing
    /// further to flush.
    pub async fn commit(&self, txn: &mut Transaction) -> StoreResult<Tid> {
        let tid = self.sequencer.next(txn).await?;
        *self.last_tid.write().expect("lock poisoned") = Some(tid);
        Ok(tid)
    }

    /// Abort: discards the transaction's cached id and pending index
    /// context. Issues no compensating writes — documents already written
    /// during the transaction remain applied.
    pub fn abort(&self, txn: &mut Transaction) {
        txn.clear();
    }

    /// The most recent committed tid seen by this storage handle.
    pub fn last_transaction(&self) -> Option<Tid> {
        *self.last_tid.read().expect("lock poisoned")
    }

    /// Conflicts raced against this transaction. Always empty: `otid` and
    /// `tid` are stamped on every write exactly as a conflict check would
    /// need, but no compare-and-swap is ever performed. A known gap, not a
    /// guarantee.
    pub async fn get_conflicts(&self, _txn: &Transaction) -> StoreResult<Vec<ObjectRecord>> {
        Ok(Vec::new())
    }

    // ---------------------------------------------------------------
    // Write path
    // ---------------------------------------------------------------

    /// Persist one object's current state.
    ///
    /// Updates to an already-stored record are written as a partial update
    /// of the mutable fields, leaving the `json` search projection in place
    /// unless the transaction carries pending "update" fields for this oid
    /// (those are merged in, field by field). A record stored for the first
    /// time gets a full document upsert including `resource`, `zoid`, and a
    /// freshly computed (or pending) `json` projection.
    ///
    /// Returns the fixed success status and the serialized byte length.
    pub async fn store(
        &self,
        oid: &Oid,
        old_serial: Option<Tid>,
        writer: &dyn RecordWriter,
        obj: &dyn RecordState,
        txn: &mut Transaction,
    ) -> StoreResult<(i32, usize)> {
        let state = writer.serialize()?;
        let part = writer.part().unwrap_or(0);
        let tid = self.sequencer.next(txn).await?;
        let size = state.len();

        if !obj.is_new() && obj.serial().is_some() {
            // Existing record: touch only the mutable fields.
            let mut ops = vec![
                SubdocOp::upsert("tid", tid.value()),
                SubdocOp::upsert("size", size as u64),
                SubdocOp::upsert("part", part),
                SubdocOp::upsert("of", oid_value(writer.of())),
                SubdocOp::upsert("otid", tid_value(old_serial)),
                SubdocOp::upsert("parent_id", oid_value(writer.parent_id())),
                SubdocOp::upsert("id", writer.id()),
                SubdocOp::upsert("type", writer.type_name()),
                SubdocOp::upsert("state", encode_state(&state)),
            ];
            if let Some(fields) = txn.pending().update_fields(oid) {
                for (key, value) in fields {
                    ops.push(SubdocOp::upsert(format!("json.{key}"), value.clone()));
                }
            }
            for chunk in ops.chunks(MAX_SUBDOC_OPS) {
                self.backend.mutate_in(oid.as_str(), chunk).await?;
            }
        } else {
            let json = match txn.pending().fields_for(oid) {
                Some(fields) => fields.clone(),
                None => writer.get_json().await?,
            };
            let record = ObjectRecord {
                oid: oid.clone(),
                tid,
                size: size as u64,
                part,
                resource: writer.resource(),
                of: writer.of(),
                otid: old_serial,
                parent_id: writer.parent_id(),
                id: writer.id().to_string(),
                type_name: writer.type_name().to_string(),
                json: Some(json),
                state,
            };
            self.backend
                .upsert(oid.as_str(), record.to_document())
                .await?;
        }

        Ok((STORE_STATUS_OK, size))
    }

    /// Remove a record. Succeeds even when the record is already absent.
    pub async fn delete(&self, oid: &Oid) -> StoreResult<()> {
        self.backend.remove(oid.as_str()).await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Read path
    // ---------------------------------------------------------------

    /// Load a record by oid, with `state` decoded back to raw bytes.
    /// A missing key is [`StoreError::NotFound`], distinct from every other
    /// failure.
    pub async fn load(&self, oid: &Oid) -> StoreResult<ObjectRecord> {
        let doc = self
            .backend
            .get(oid.as_str())
            .await?
            .ok_or_else(|| StoreError::NotFound(oid.clone()))?;
        Ok(ObjectRecord::from_document(doc)?)
    }

    /// Load the tree root.
    pub async fn root(&self) -> StoreResult<ObjectRecord> {
        self.load(&Oid::root()).await
    }

    // ---------------------------------------------------------------
    // Tree queries
    // ---------------------------------------------------------------

    /// Names of all children of a parent.
    pub async fn keys(&self, parent: &Oid) -> StoreResult<Vec<String>> {
        let rows = self
            .backend
            .query(&Query::select(["id"]).filter_eq("parent_id", parent.as_str()))
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.get("id") {
                Some(Value::String(id)) => Some(id.clone()),
                _ => None,
            })
            .collect())
    }

    /// Fetch one child by name, or `None` when no such child exists.
    pub async fn get_child(&self, parent: &Oid, name: &str) -> StoreResult<Option<ObjectRecord>> {
        let rows = self
            .backend
            .query(
                &Query::select(RECORD_FIELDS)
                    .filter_eq("parent_id", parent.as_str())
                    .filter_eq("id", name)
                    .limit(1),
            )
            .await?;
        rows.into_iter()
            .next()
            .map(|doc| ObjectRecord::from_document(doc).map_err(StoreError::from))
            .transpose()
    }

    /// Whether a child with this name exists. Short-circuits on the first
    /// match.
    pub async fn has_key(&self, parent: &Oid, name: &str) -> StoreResult<bool> {
        let rows = self
            .backend
            .query(
                &Query::select(["zoid"])
                    .filter_eq("parent_id", parent.as_str())
                    .filter_eq("id", name)
                    .limit(1),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Number of children of a parent.
    pub async fn len(&self, parent: &Oid) -> StoreResult<u64> {
        let filter = [Condition::Eq {
            field: "parent_id".to_string(),
            value: Value::from(parent.as_str()),
        }];
        Ok(self.backend.count(&filter).await?)
    }

    /// All children of a parent, decoded lazily. One query per call; the
    /// returned iterator is a single pass and not restartable.
    pub async fn items(
        &self,
        parent: &Oid,
    ) -> StoreResult<impl Iterator<Item = StoreResult<ObjectRecord>>> {
        let rows = self
            .backend
            .query(&Query::select(RECORD_FIELDS).filter_eq("parent_id", parent.as_str()))
            .await?;
        Ok(rows
            .into_iter()
            .map(|doc| ObjectRecord::from_document(doc).map_err(StoreError::from)))
    }

    /// Fetch the named children of a parent in one query.
    pub async fn get_children(
        &self,
        parent: &Oid,
        names: &[&str],
    ) -> StoreResult<Vec<ObjectRecord>> {
        let rows = self
            .backend
            .query(
                &Query::select(RECORD_FIELDS)
                    .filter_eq("parent_id", parent.as_str())
                    .filter_in("id", names.iter().copied()),
            )
            .await?;
        rows.into_iter()
            .map(|doc| ObjectRecord::from_document(doc).map_err(StoreError::from))
            .collect()
    }

    /// Fetch an annotation by owner and name. Matches on the `of` owner
    /// reference only, never on the structural parent.
    pub async fn get_annotation(
        &self,
        owner: &Oid,
        name: &str,
    ) -> StoreResult<Option<ObjectRecord>> {
        let rows = self
            .backend
            .query(
                &Query::select(ANNOTATION_FIELDS)
                    .filter_eq("of", owner.as_str())
                    .filter_eq("id", name)
                    .limit(1),
            )
            .await?;
        rows.into_iter()
            .next()
            .map(|doc| ObjectRecord::from_document(doc).map_err(StoreError::from))
            .transpose()
    }

    /// Names (and structural parents) of all annotations of an owner.
    pub async fn get_annotation_keys(&self, owner: &Oid) -> StoreResult<Vec<AnnotationKey>> {
        let rows = self
            .backend
            .query(&Query::select(["id", "parent_id"]).filter_eq("of", owner.as_str()))
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = match row.get("id") {
                    Some(Value::String(id)) => id.clone(),
                    _ => return None,
                };
                let parent_id = match row.get("parent_id") {
                    Some(Value::String(parent)) => Some(Oid::from(parent.as_str())),
                    _ => None,
                };
                Some(AnnotationKey { id, parent_id })
            })
            .collect())
    }

    /// Paginated key listing. Interface point only: the parameters are
    /// accepted but no pagination is applied — every child name is
    /// returned.
    pub async fn get_page_of_keys(
        &self,
        parent: &Oid,
        _page: usize,
        _page_size: usize,
    ) -> StoreResult<Vec<String>> {
        self.keys(parent).await
    }

    // ---------------------------------------------------------------
    // Blob storage (unimplemented upstream)
    // ---------------------------------------------------------------

    pub async fn read_blob_chunk(&self, _bid: &Oid, _chunk: usize) -> StoreResult<Vec<u8>> {
        Err(StoreError::Unsupported("read_blob_chunk"))
    }

    pub async fn write_blob_chunk(
        &self,
        _bid: &Oid,
        _oid: &Oid,
        _chunk_index: usize,
        _data: &[u8],
    ) -> StoreResult<()> {
        Err(StoreError::Unsupported("write_blob_chunk"))
    }

    pub async fn del_blob(&self, _bid: &Oid) -> StoreResult<()> {
        Err(StoreError::Unsupported("del_blob"))
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("bucket", &self.backend.bucket_name())
            .field("tid_strategy", &self.config.tid_strategy)
            .field("read_only", &self.config.read_only)
            .finish()
    }
}

fn oid_value(oid: Option<Oid>) -> Value {
    match oid {
        Some(oid) => Value::String(oid.as_str().to_string()),
        None => Value::Null,
    }
}

fn tid_value(tid: Option<Tid>) -> Value {
    match tid {
        Some(tid) => Value::from(tid.value()),
        None => Value::Null,
    }
}
