//! The unit of work: a transaction and its precomputed index side channel.

use std::collections::HashMap;

use serde_json::{Map, Value};

use canopy_types::{Oid, Tid};

/// Precomputed search-projection field values produced by an earlier stage
/// of the same unit of work, threaded explicitly into the write path so the
/// projection does not have to be recomputed.
///
/// Two field sets exist per oid: "update" (changed fields of an existing
/// record) and "index" (the full projection of a new record). Wherever both
/// are consulted, "update" takes precedence.
#[derive(Clone, Debug, Default)]
pub struct PendingIndexContext {
    update: HashMap<Oid, Map<String, Value>>,
    index: HashMap<Oid, Map<String, Value>>,
}

impl PendingIndexContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record "update" fields for an oid.
    pub fn set_update(&mut self, oid: Oid, fields: Map<String, Value>) {
        self.update.insert(oid, fields);
    }

    /// Record "index" fields for an oid.
    pub fn set_index(&mut self, oid: Oid, fields: Map<String, Value>) {
        self.index.insert(oid, fields);
    }

    /// The "update" field set for an oid, if any.
    pub fn update_fields(&self, oid: &Oid) -> Option<&Map<String, Value>> {
        self.update.get(oid)
    }

    /// The field set for an oid, "update" winning over "index".
    pub fn fields_for(&self, oid: &Oid) -> Option<&Map<String, Value>> {
        self.update.get(oid).or_else(|| self.index.get(oid))
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.index.is_empty()
    }
}

/// One logical unit of work against the storage adapter.
///
/// Holds the transaction id once assigned (assigned at most once; see
/// [`TidSequencer`](crate::TidSequencer)) and the optional pending index
/// context. Ephemeral: aborting discards this local state and nothing else.
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    tid: Option<Tid>,
    pending: PendingIndexContext,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transaction carrying precomputed index fields.
    pub fn with_pending(pending: PendingIndexContext) -> Self {
        Self {
            tid: None,
            pending,
        }
    }

    /// The cached transaction id, if one has been assigned.
    pub fn tid(&self) -> Option<Tid> {
        self.tid
    }

    pub(crate) fn cache_tid(&mut self, tid: Tid) {
        self.tid = Some(tid);
    }

    pub fn pending(&self) -> &PendingIndexContext {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingIndexContext {
        &mut self.pending
    }

    /// Drop all transaction-local state. Called on abort; already-applied
    /// document writes are NOT rolled back.
    pub(crate) fn clear(&mut self) {
        self.tid = None;
        self.pending = PendingIndexContext::new();
    }
}
