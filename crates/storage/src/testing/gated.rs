//! Driver wrapper that parks writes until released

use crate::driver::{KeyTableDriver, RawKeyTable};
use async_trait::async_trait;
use slotdb_core::{DriverError, TableId};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

/// Holds every write at a gate until the test releases it
///
/// Lets a test observe the index while a flush is in flight. Reads pass
/// straight through.
pub struct GatedDriver {
    inner: Arc<dyn KeyTableDriver>,
    gate: Semaphore,
    arrived: Notify,
}

impl GatedDriver {
    /// Wrap `inner` with the gate closed
    pub fn new(inner: Arc<dyn KeyTableDriver>) -> Self {
        GatedDriver {
            inner,
            gate: Semaphore::new(0),
            arrived: Notify::new(),
        }
    }

    /// Wait until a write has reached the gate
    pub async fn wait_for_write(&self) {
        self.arrived.notified().await;
    }

    /// Let `n` parked or future writes through
    pub fn release_writes(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl KeyTableDriver for GatedDriver {
    async fn read_key_table(&self, table: &TableId) -> Result<RawKeyTable, DriverError> {
        self.inner.read_key_table(table).await
    }

    async fn write_key_table(&self, table: &TableId, keys: RawKeyTable) -> Result<(), DriverError> {
        self.arrived.notify_one();
        self.gate
            .acquire()
            .await
            .map_err(|e| DriverError::Unavailable(e.to_string()))?
            .forget();
        self.inner.write_key_table(table, keys).await
    }
}
