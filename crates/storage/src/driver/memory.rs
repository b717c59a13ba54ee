//! In-process key table driver
//!
//! Tables live in a `RwLock<HashMap>` for the lifetime of the driver.
//! Nothing survives the process, which makes this the driver for tests and
//! ephemeral databases.

use super::{KeyTableDriver, RawKeyTable};
use async_trait::async_trait;
use parking_lot::RwLock;
use slotdb_core::{DriverError, TableId};
use std::collections::HashMap;
use tracing::debug;

/// Key table driver backed by process memory
#[derive(Debug, Default)]
pub struct MemoryDriver {
    tables: RwLock<HashMap<TableId, RawKeyTable>>,
}

impl MemoryDriver {
    /// Create a driver with no tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored table for `table` outside of any index
    ///
    /// Models another writer mutating the durable table; indices pick the
    /// change up on their next refresh.
    pub fn replace_table(&self, table: &TableId, keys: RawKeyTable) {
        self.tables.write().insert(table.clone(), keys);
    }

    /// Drop the stored table for `table` (external bulk clear)
    ///
    /// Returns true if a table was stored.
    pub fn clear_table(&self, table: &TableId) -> bool {
        self.tables.write().remove(table).is_some()
    }

    /// Current stored table for `table`, if one was ever written
    pub fn table(&self, table: &TableId) -> Option<RawKeyTable> {
        self.tables.read().get(table).cloned()
    }

    /// Number of stored tables
    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }
}

#[async_trait]
impl KeyTableDriver for MemoryDriver {
    async fn read_key_table(&self, table: &TableId) -> Result<RawKeyTable, DriverError> {
        Ok(self.table(table).unwrap_or_default())
    }

    async fn write_key_table(&self, table: &TableId, keys: RawKeyTable) -> Result<(), DriverError> {
        debug!(
            target: "slotdb::driver",
            table = %table,
            keys = keys.len(),
            "Key table stored in memory"
        );
        self.tables.write().insert(table.clone(), keys);
        Ok(())
    }
}
