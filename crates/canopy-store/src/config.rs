use serde::{Deserialize, Serialize};

use crate::sequencer::TidStrategy;

/// Connection and behavior options for a [`Storage`](crate::Storage).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store endpoint base, e.g. `couchbase://localhost`.
    pub dsn: String,
    pub username: String,
    pub password: String,
    /// The bucket (namespace) holding all records of one logical database.
    pub bucket: String,
    /// Advisory flag for the hosting framework; mutation paths are disabled
    /// at a higher layer, not enforced inside this adapter.
    pub read_only: bool,
    /// How transaction ids are assigned.
    pub tid_strategy: TidStrategy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dsn: "couchbase://localhost".to_string(),
            username: String::new(),
            password: String::new(),
            bucket: "canopy".to_string(),
            read_only: false,
            tid_strategy: TidStrategy::Counter,
        }
    }
}
