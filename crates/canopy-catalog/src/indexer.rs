use std::any::Any;
use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use canopy_bucket::{SubdocOp, MAX_SUBDOC_OPS};
use canopy_store::{Storage, StoreResult};
use canopy_types::Oid;

/// Applies batched search-projection updates to stored documents.
///
/// The container's storage is passed dynamically because the hosting
/// framework can mount several database backends side by side; when the
/// storage behind this container is not a Canopy [`Storage`], the update is
/// logged and skipped rather than failing the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogIndexer;

impl CatalogIndexer {
    pub fn new() -> Self {
        Self
    }

    /// Push the given per-record field values into the stored documents.
    ///
    /// For each oid, one subdocument operation is built per field and the
    /// accumulated operations are flushed whenever the 16-op mutate-in limit
    /// is reached, with a final flush for the remainder — `N` fields for one
    /// record always cost `ceil(N/16)` partial-update calls.
    pub async fn index(
        &self,
        container_storage: &(dyn Any + Send + Sync),
        batches: &HashMap<Oid, Map<String, Value>>,
    ) -> StoreResult<()> {
        let Some(storage) = container_storage.downcast_ref::<Storage>() else {
            warn!("storage does not support multiple backend types mounted together, skipping index update");
            return Ok(());
        };

        for (oid, fields) in batches {
            let mut ops: Vec<SubdocOp> = Vec::with_capacity(MAX_SUBDOC_OPS);
            for (key, value) in fields {
                ops.push(SubdocOp::upsert(key.clone(), value.clone()));
                if ops.len() >= MAX_SUBDOC_OPS {
                    storage.backend().mutate_in(oid.as_str(), &ops).await?;
                    ops.clear();
                }
            }
            if !ops.is_empty() {
                storage.backend().mutate_in(oid.as_str(), &ops).await?;
            }
        }
        Ok(())
    }

    /// Updating existing entries is the same operation as indexing new ones.
    pub async fn update(
        &self,
        container_storage: &(dyn Any + Send + Sync),
        batches: &HashMap<Oid, Map<String, Value>>,
    ) -> StoreResult<()> {
        self.index(container_storage, batches).await
    }
}
