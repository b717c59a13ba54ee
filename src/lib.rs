//! slotdb - key-to-slot indexing core for an embedded object store
//!
//! Every (entity type, key type) pair has a key table recording which
//! primary keys exist and which storage slot holds each key's body. A
//! [`KeyIndex`] is the in-memory authority over one such table; it loads
//! the table through a [`KeyTableDriver`] and writes it back on flush.
//!
//! # Quick Start
//!
//! ```ignore
//! use slotdb::{KeyIndex, MemoryDriver};
//! use std::sync::Arc;
//!
//! let driver = Arc::new(MemoryDriver::new());
//! let people = KeyIndex::<Person, String>::open(driver, |name| load_person(name)).await?;
//!
//! let slot = people.add_key("alice".to_string()).await?;
//! assert_eq!(people.get_index_for_key(&"alice".to_string()), Some(slot));
//!
//! people.flush().await?;
//! ```
//!
//! # Architecture
//!
//! - `slotdb-core`: shared types and errors
//! - `slotdb-storage`: the index, key entries, drivers and their file format

pub use slotdb_core::{
    DriverError, Error, IndexKey, Result, SlotIndex, TableId, NOT_FOUND_SENTINEL,
};
pub use slotdb_storage::{
    flush_all, DriverConfig, Durability, FileDriver, KeyCollection, KeyEntry, KeyIndex,
    KeyTableDriver, MemoryDriver, RawKeyTable, Resolver, CONFIG_FILE_NAME,
};

/// Driver test doubles and the reference model used by property tests
pub use slotdb_storage::testing;
