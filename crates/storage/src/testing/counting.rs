//! Driver wrapper counting I/O calls

use crate::driver::{KeyTableDriver, RawKeyTable};
use async_trait::async_trait;
use slotdb_core::{DriverError, TableId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts every read and write passed through to the inner driver
///
/// Calls are counted whether or not the inner driver succeeds.
pub struct CountingDriver {
    inner: Arc<dyn KeyTableDriver>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingDriver {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn KeyTableDriver>) -> Self {
        CountingDriver {
            inner,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `read_key_table` calls so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `write_key_table` calls so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Reset both counters to zero
    pub fn reset(&self) {
        self.reads.store(0, Ordering::SeqCst);
        self.writes.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyTableDriver for CountingDriver {
    async fn read_key_table(&self, table: &TableId) -> Result<RawKeyTable, DriverError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_key_table(table).await
    }

    async fn write_key_table(&self, table: &TableId, keys: RawKeyTable) -> Result<(), DriverError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_key_table(table, keys).await
    }
}
