//! Storage layer for slotdb key indices
//!
//! This crate implements the key-indexing core:
//! - KeyIndex: in-memory key→slot authority for one table
//! - KeyEntry: key handle that resolves its entity lazily
//! - KeyTableDriver: async persistence contract for key tables
//! - MemoryDriver / FileDriver: in-process and crash-safe file drivers
//! - KeyCollection: type-erased lifecycle over indices of any key type
//!
//! # Slot allocation
//!
//! Slots are handed out by a per-index monotonic counter and are never
//! reused within the lifetime of an index, including after removals and
//! refreshes. Only `truncate`, which follows an external clear of the
//! table, restarts the counter from what the driver holds.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod collection;
pub mod config;
pub mod driver;
pub mod entry;
pub mod format;
pub mod key_index;
pub mod testing;

pub use collection::{flush_all, KeyCollection};
pub use config::{DriverConfig, Durability, CONFIG_FILE_NAME};
pub use driver::{FileDriver, KeyTableDriver, MemoryDriver, RawKeyTable};
pub use entry::{KeyEntry, Resolver};
pub use key_index::KeyIndex;
