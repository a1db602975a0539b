//! The collaborator contract expected from the object-serialization layer.
//!
//! The hosting persistence framework owns object serialization; the adapter
//! only consumes it through these two capability traits. No reflection, no
//! duck typing — the exact surface the write path reads is enumerated here.

use async_trait::async_trait;
use serde_json::{Map, Value};

use canopy_types::{Oid, Tid};

use crate::error::StoreResult;

/// Writer view of an object being stored: its opaque serialized state, its
/// search projection, and the structural fields written verbatim into the
/// document.
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// The opaque serialized object state.
    fn serialize(&self) -> StoreResult<Vec<u8>>;

    /// The denormalized projection of indexable fields for search queries.
    /// May be expensive; the write path skips it whenever a pending index
    /// context already carries the fields.
    async fn get_json(&self) -> StoreResult<Map<String, Value>>;

    /// Partition/shard hint; the adapter substitutes 0 when `None`.
    fn part(&self) -> Option<i64>;

    /// Owning resource when this record is an annotation.
    fn of(&self) -> Option<Oid>;

    /// Structural parent in the content tree.
    fn parent_id(&self) -> Option<Oid>;

    /// The record's name, unique among siblings.
    fn id(&self) -> &str;

    /// Content-type discriminator.
    fn type_name(&self) -> &str;

    /// Whether the record is a top-level content resource.
    fn resource(&self) -> bool;
}

/// Persistence view of the object: whether it has ever been stored and which
/// version the caller last observed.
pub trait RecordState: Send + Sync {
    /// `true` until the object's first successful store.
    fn is_new(&self) -> bool;

    /// The tid the caller last observed for this object, if any.
    fn serial(&self) -> Option<Tid>;
}
