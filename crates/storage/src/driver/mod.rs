//! Key table persistence
//!
//! The index never touches a storage medium directly. It reads and writes
//! whole key tables through a [`KeyTableDriver`], which is shared by every
//! index of a database instance.
//!
//! Drivers store keys as opaque bytes. The [`adapter`] functions convert
//! between typed key→slot bindings and the [`RawKeyTable`] a driver sees,
//! so one driver serves every key type.
//!
//! Implementations:
//! - [`MemoryDriver`]: process-local tables, for tests and ephemeral stores
//! - [`FileDriver`]: one crash-safe file per table

pub mod adapter;
mod file;
mod memory;

pub use adapter::{decode_table, encode_key, encode_table};
pub use file::FileDriver;
pub use memory::MemoryDriver;

use async_trait::async_trait;
use slotdb_core::{DriverError, SlotIndex, TableId};
use std::collections::BTreeMap;

/// Key table as seen by a driver: encoded key bytes → slot
pub type RawKeyTable = BTreeMap<Vec<u8>, SlotIndex>;

/// Durable storage of key tables
///
/// # Contract
///
/// - `read_key_table` returns an empty table, not an error, when no table
///   has been written for `table`.
/// - `write_key_table` replaces the full table. After it returns `Ok`,
///   a subsequent read returns exactly `keys`.
#[async_trait]
pub trait KeyTableDriver: Send + Sync {
    /// Read the persisted key table for `table`
    async fn read_key_table(&self, table: &TableId) -> Result<RawKeyTable, DriverError>;

    /// Durably overwrite the key table for `table`
    async fn write_key_table(&self, table: &TableId, keys: RawKeyTable) -> Result<(), DriverError>;
}
