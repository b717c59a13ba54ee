//! Conversion between typed key bindings and driver tables
//!
//! Keys are encoded with MessagePack. Decoding validates the snapshot
//! before the index trusts it: every key must decode, no two keys may share
//! a slot, and no slot may sit at the top of the slot space (the allocator
//! would have nowhere to go).

use super::RawKeyTable;
use slotdb_core::{DriverError, IndexKey, SlotIndex};
use std::collections::{HashMap, HashSet};

/// Encode a single key to the bytes a driver stores
pub fn encode_key<K: IndexKey>(key: &K) -> Result<Vec<u8>, DriverError> {
    Ok(rmp_serde::to_vec(key)?)
}

/// Encode typed bindings into a driver table
pub fn encode_table<'a, K, I>(bindings: I) -> Result<RawKeyTable, DriverError>
where
    K: IndexKey,
    I: IntoIterator<Item = (&'a K, &'a SlotIndex)>,
{
    bindings
        .into_iter()
        .map(|(key, slot)| encode_key(key).map(|bytes| (bytes, *slot)))
        .collect()
}

/// Decode and validate a driver table
///
/// Returns the bindings ordered by slot, which is the order the keys were
/// originally added in.
pub fn decode_table<K: IndexKey>(raw: &RawKeyTable) -> Result<Vec<(K, SlotIndex)>, DriverError> {
    let mut bindings = Vec::with_capacity(raw.len());
    let mut seen_keys: HashMap<K, SlotIndex> = HashMap::with_capacity(raw.len());
    let mut seen_slots: HashSet<SlotIndex> = HashSet::with_capacity(raw.len());

    for (bytes, &slot) in raw {
        let key: K = rmp_serde::from_slice(bytes)?;

        if slot == SlotIndex::MAX {
            return Err(DriverError::Corrupt(format!(
                "key {:?} bound to reserved slot {}",
                key, slot
            )));
        }
        if !seen_slots.insert(slot) {
            return Err(DriverError::Corrupt(format!(
                "slot {} bound to more than one key",
                slot
            )));
        }
        if let Some(previous) = seen_keys.insert(key.clone(), slot) {
            return Err(DriverError::Corrupt(format!(
                "key {:?} bound to slots {} and {}",
                key, previous, slot
            )));
        }

        bindings.push((key, slot));
    }

    bindings.sort_by_key(|(_, slot)| *slot);
    Ok(bindings)
}
