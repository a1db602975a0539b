//! Transaction id assignment.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use canopy_bucket::DocumentBackend;
use canopy_types::Tid;

use crate::error::StoreResult;
use crate::txn::Transaction;

/// The well-known counter document serializing id allocation under the
/// counter strategy.
pub(crate) const TXN_COUNTER_KEY: &str = "__canopy_txn_counter";

/// How transaction ids are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TidStrategy {
    /// Atomically increment one well-known counter document. Ids increase
    /// strictly across the whole store; allocation serializes through one
    /// hot document, which is the throughput bottleneck under load.
    #[default]
    Counter,
    /// Draw a random nonzero token. No hot document, but no ordering:
    /// callers needing "last transaction wins" cannot compare these
    /// numerically.
    Random,
}

/// Assigns each transaction its id, at most once.
pub struct TidSequencer {
    strategy: TidStrategy,
    backend: Arc<dyn DocumentBackend>,
}

impl TidSequencer {
    pub fn new(strategy: TidStrategy, backend: Arc<dyn DocumentBackend>) -> Self {
        Self { strategy, backend }
    }

    /// The id for this transaction. Idempotent: once assigned, the same
    /// transaction always gets the same id back. A failed counter increment
    /// propagates — the transaction cannot proceed without an id.
    pub async fn next(&self, txn: &mut Transaction) -> StoreResult<Tid> {
        if let Some(tid) = txn.tid() {
            return Ok(tid);
        }
        let tid = match self.strategy {
            TidStrategy::Counter => {
                Tid::new(self.backend.counter(TXN_COUNTER_KEY, 1, 1).await?)
            }
            TidStrategy::Random => {
                let mut token: u64 = rand::random();
                while token == 0 {
                    token = rand::random();
                }
                Tid::new(token)
            }
        };
        txn.cache_tid(tid);
        Ok(tid)
    }
}
