//! Driver wrapper with switchable failure injection

use crate::driver::{KeyTableDriver, RawKeyTable};
use async_trait::async_trait;
use slotdb_core::{DriverError, TableId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fails reads and/or writes on demand, otherwise delegates to the inner driver
///
/// A failed write never reaches the inner driver, so its durable table is
/// left as it was.
pub struct FailingDriver {
    inner: Arc<dyn KeyTableDriver>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingDriver {
    /// Wrap `inner` with both failure switches off
    pub fn new(inner: Arc<dyn KeyTableDriver>) -> Self {
        FailingDriver {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent reads fail (or succeed again)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyTableDriver for FailingDriver {
    async fn read_key_table(&self, table: &TableId) -> Result<RawKeyTable, DriverError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DriverError::Unavailable(format!(
                "injected read failure for {}",
                table
            )));
        }
        self.inner.read_key_table(table).await
    }

    async fn write_key_table(&self, table: &TableId, keys: RawKeyTable) -> Result<(), DriverError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DriverError::Unavailable(format!(
                "injected write failure for {}",
                table
            )));
        }
        self.inner.write_key_table(table, keys).await
    }
}
