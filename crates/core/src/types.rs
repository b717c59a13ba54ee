//! Core type definitions for slotdb
//!
//! This module defines the foundational types shared by every layer:
//! - SlotIndex: stable storage slot bound to a key
//! - TableId: identifies the key table of one (entity type, key type) pair
//! - IndexKey: capability bound for values usable as primary keys

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Stable integer locating where an entity's serialized body is stored
///
/// Assigned once per key by the index's allocator and never reused.
pub type SlotIndex = u64;

/// Sentinel returned by sentinel-style lookups when a key is not bound
pub const NOT_FOUND_SENTINEL: i64 = -1;

/// Capability bound for primary key values
///
/// Identity of a key is its value: equality and hashing are all the index
/// relies on. Keys must also serialize so drivers can persist them.
pub trait IndexKey:
    Eq + Hash + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<K> IndexKey for K where
    K: Eq + Hash + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Identifier of one durable key table
///
/// One table exists per (entity type, key type) pair. The names are opaque
/// to the index; drivers use them to locate the persisted table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
    entity_type: String,
    key_type: String,
}

impl TableId {
    /// Create a table identifier from explicit names
    pub fn new(entity_type: impl Into<String>, key_type: impl Into<String>) -> Self {
        TableId {
            entity_type: entity_type.into(),
            key_type: key_type.into(),
        }
    }

    /// Table identifier for entity type `T` keyed by `K`
    ///
    /// Uses the Rust type names, so renaming or moving a type changes the
    /// table it maps to.
    pub fn of<T: ?Sized, K: ?Sized>() -> Self {
        TableId::new(std::any::type_name::<T>(), std::any::type_name::<K>())
    }

    /// Entity type name
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Key type name
    pub fn key_type(&self) -> &str {
        &self.key_type
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.entity_type, self.key_type)
    }
}
