//! Primary key index for one (entity type, key type) pair
//!
//! The index is the in-memory authority for which keys exist in a table and
//! which storage slot each key's body lives in. It is loaded in full from
//! the driver when opened and written back in full on flush.
//!
//! # Slot allocation
//!
//! Slots come from a monotonic counter. A removed key's slot is never handed
//! to another key, so a reader holding a stale slot can never observe a
//! different entity's body there. After a load the counter resumes at one
//! past the highest persisted slot.
//!
//! # Concurrency
//!
//! Two locks:
//! - `writer` (async mutex) serializes add, remove, flush, refresh and
//!   truncate, and is held across driver I/O.
//! - `state` (`RwLock`) guards the (entries, slots, next slot, dirty) tuple.
//!   It is only held for in-memory work, never across an `.await`.
//!
//! Readers take only `state`, so lookups proceed while a flush is in
//! flight and always see a fully applied mutation.

use crate::driver::{decode_table, encode_table, KeyTableDriver};
use crate::entry::{KeyEntry, Resolver};
use parking_lot::RwLock;
use slotdb_core::{Error, IndexKey, Result, SlotIndex, TableId, NOT_FOUND_SENTINEL};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, trace, warn};

/// What a reload does with the slot counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Counter {
    /// Never go below the current counter
    Keep,
    /// Resume after the highest reloaded slot
    Reset,
}

struct Binding<T, K> {
    slot: SlotIndex,
    entry: Arc<KeyEntry<T, K>>,
}

struct IndexState<T, K> {
    /// Entries in insertion order
    entries: Vec<Arc<KeyEntry<T, K>>>,
    slots: HashMap<K, Binding<T, K>>,
    next_slot: SlotIndex,
    dirty: bool,
}

impl<T, K> IndexState<T, K> {
    fn empty() -> Self {
        IndexState {
            entries: Vec::new(),
            slots: HashMap::new(),
            next_slot: 0,
            dirty: false,
        }
    }
}

/// Key→slot index for entities of type `T` keyed by `K`
pub struct KeyIndex<T, K> {
    table: TableId,
    driver: Arc<dyn KeyTableDriver>,
    resolver: Resolver<T, K>,
    writer: AsyncMutex<()>,
    state: RwLock<IndexState<T, K>>,
}

impl<T, K> KeyIndex<T, K>
where
    T: Send + Sync + 'static,
    K: IndexKey,
{
    /// Open the index for `T` keyed by `K`, named after the Rust types
    ///
    /// Resolves once the persisted key table is fully loaded; the index is
    /// never observable half-populated. A missing table yields an empty
    /// index.
    ///
    /// # Errors
    ///
    /// `Error::DriverRead` if the table cannot be read or fails validation.
    pub async fn open<F>(driver: Arc<dyn KeyTableDriver>, resolver: F) -> Result<Self>
    where
        F: Fn(&K) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        Self::open_table(TableId::of::<T, K>(), driver, resolver).await
    }

    /// Open the index over an explicitly named table
    pub async fn open_table<F>(
        table: TableId,
        driver: Arc<dyn KeyTableDriver>,
        resolver: F,
    ) -> Result<Self>
    where
        F: Fn(&K) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        let resolver: Resolver<T, K> = Arc::new(resolver);
        let state = load_state(&table, driver.as_ref(), &resolver).await?;

        info!(
            target: "slotdb::keys",
            table = %table,
            keys = state.entries.len(),
            next_slot = state.next_slot,
            "Key index loaded"
        );

        Ok(KeyIndex {
            table,
            driver,
            resolver,
            writer: AsyncMutex::new(()),
            state: RwLock::new(state),
        })
    }

    /// Table this index covers
    pub fn table_id(&self) -> &TableId {
        &self.table
    }

    /// Snapshot of the entries in insertion order
    ///
    /// The returned vector is a copy; changing it does not touch the index.
    pub fn query(&self) -> Vec<Arc<KeyEntry<T, K>>> {
        self.state.read().entries.clone()
    }

    /// Slot bound to `key`, or `None` if the key is not in the table
    pub fn get_index_for_key(&self, key: &K) -> Option<SlotIndex> {
        self.state.read().slots.get(key).map(|b| b.slot)
    }

    /// Slot bound to `key` as a signed value, `NOT_FOUND_SENTINEL` if absent
    pub fn raw_index_for_key(&self, key: &K) -> i64 {
        self.get_index_for_key(key)
            .and_then(|slot| i64::try_from(slot).ok())
            .unwrap_or(NOT_FOUND_SENTINEL)
    }

    /// Entry for `key`, if present
    pub fn entry(&self, key: &K) -> Option<Arc<KeyEntry<T, K>>> {
        self.state.read().slots.get(key).map(|b| Arc::clone(&b.entry))
    }

    /// True if `key` is in the table
    pub fn contains_key(&self, key: &K) -> bool {
        self.state.read().slots.contains_key(key)
    }

    /// Number of keys in the table
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// True if the table has no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot the next new key will receive
    pub fn next_slot(&self) -> SlotIndex {
        self.state.read().next_slot
    }

    /// True if there are mutations not yet flushed to the driver
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Add `key` or refresh it if already present
    ///
    /// A new key is appended, bound to the next slot and marks the index
    /// dirty. An existing key keeps its slot; its entry drops any cached
    /// entity so the next access re-resolves, and dirtiness is unchanged.
    ///
    /// Returns the key's slot.
    ///
    /// # Errors
    ///
    /// `Error::SlotSpaceExhausted` if no slot is left to allocate.
    pub async fn add_key(&self, key: K) -> Result<SlotIndex> {
        let _writer = self.writer.lock().await;
        let mut state = self.state.write();

        if let Some(binding) = state.slots.get(&key) {
            binding.entry.refresh();
            trace!(
                target: "slotdb::keys",
                table = %self.table,
                key = ?key,
                slot = binding.slot,
                "Key refreshed"
            );
            return Ok(binding.slot);
        }

        let slot = state.next_slot;
        let next_slot = slot
            .checked_add(1)
            .ok_or_else(|| Error::SlotSpaceExhausted(self.table.clone()))?;

        let entry = Arc::new(KeyEntry::new(key.clone(), Arc::clone(&self.resolver)));
        state.entries.push(Arc::clone(&entry));
        state.slots.insert(key.clone(), Binding { slot, entry });
        state.next_slot = next_slot;
        state.dirty = true;

        debug!(target: "slotdb::keys", table = %self.table, key = ?key, slot, "Key added");
        Ok(slot)
    }

    /// Remove `key`
    ///
    /// Absent keys are ignored and leave dirtiness unchanged. Other keys
    /// keep their slots; nothing is compacted.
    ///
    /// Returns true if the key was present.
    pub async fn remove_key(&self, key: &K) -> bool {
        let _writer = self.writer.lock().await;
        let mut state = self.state.write();

        let Some(binding) = state.slots.remove(key) else {
            return false;
        };
        state.entries.retain(|entry| entry.key() != key);
        state.dirty = true;

        debug!(
            target: "slotdb::keys",
            table = %self.table,
            key = ?key,
            slot = binding.slot,
            "Key removed"
        );
        true
    }

    /// Write the key table if it has unflushed mutations
    ///
    /// A clean index performs no I/O. Returns true if the table was written.
    ///
    /// # Errors
    ///
    /// `Error::DriverWrite` if the driver rejects the write; the index stays
    /// dirty so a later flush retries.
    pub async fn flush(&self) -> Result<bool> {
        let _writer = self.writer.lock().await;
        self.flush_locked().await
    }

    /// Flush pending mutations, then reload the table from the driver
    ///
    /// Used after the durable table was changed by someone else. The slot
    /// counter never moves backwards, so slots retired by this index stay
    /// retired. On any failure the in-memory state is left exactly as it
    /// was.
    pub async fn refresh(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        self.flush_locked().await?;
        self.reload_locked(Counter::Keep).await?;

        info!(
            target: "slotdb::keys",
            table = %self.table,
            keys = self.len(),
            "Key index refreshed"
        );
        Ok(())
    }

    /// Discard pending mutations and reload the table from the driver
    ///
    /// Does not delete durable data: the table layer clears the durable
    /// table first, then truncates the index to resynchronize. The slot
    /// counter restarts from the reloaded table, since the cleared bodies
    /// are gone with their slots. Completes only once the reload has been
    /// applied.
    pub async fn truncate(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        self.reload_locked(Counter::Reset).await?;

        info!(
            target: "slotdb::keys",
            table = %self.table,
            keys = self.len(),
            "Key index truncated"
        );
        Ok(())
    }

    async fn flush_locked(&self) -> Result<bool> {
        let (keys, count) = {
            let state = self.state.read();
            if !state.dirty {
                trace!(target: "slotdb::keys", table = %self.table, "Flush skipped, index clean");
                return Ok(false);
            }
            let keys = encode_table(state.slots.iter().map(|(key, b)| (key, &b.slot)))
                .map_err(|e| Error::write(&self.table, e))?;
            (keys, state.slots.len())
        };

        if let Err(e) = self.driver.write_key_table(&self.table, keys).await {
            warn!(
                target: "slotdb::keys",
                table = %self.table,
                error = %e,
                "Key table flush failed"
            );
            return Err(Error::write(&self.table, e));
        }

        // The writer lock is held, so nothing mutated the state since the
        // snapshot above.
        self.state.write().dirty = false;
        debug!(target: "slotdb::keys", table = %self.table, keys = count, "Key table flushed");
        Ok(true)
    }

    async fn reload_locked(&self, counter: Counter) -> Result<()> {
        match load_state(&self.table, self.driver.as_ref(), &self.resolver).await {
            Ok(mut loaded) => {
                let mut state = self.state.write();
                if counter == Counter::Keep {
                    loaded.next_slot = loaded.next_slot.max(state.next_slot);
                }
                *state = loaded;
                Ok(())
            }
            Err(e) => {
                warn!(
                    target: "slotdb::keys",
                    table = %self.table,
                    error = %e,
                    "Key table reload failed"
                );
                Err(e)
            }
        }
    }
}

async fn load_state<T, K: IndexKey>(
    table: &TableId,
    driver: &dyn KeyTableDriver,
    resolver: &Resolver<T, K>,
) -> Result<IndexState<T, K>> {
    let raw = driver
        .read_key_table(table)
        .await
        .map_err(|e| Error::read(table, e))?;
    let bindings = decode_table::<K>(&raw).map_err(|e| Error::read(table, e))?;

    let mut state = IndexState::empty();
    state.entries.reserve(bindings.len());
    state.slots.reserve(bindings.len());

    for (key, slot) in bindings {
        let entry = Arc::new(KeyEntry::new(key.clone(), Arc::clone(resolver)));
        state.entries.push(Arc::clone(&entry));
        state.slots.insert(key, Binding { slot, entry });
        // decode_table rejects SlotIndex::MAX, so this cannot overflow
        state.next_slot = state.next_slot.max(slot + 1);
    }

    Ok(state)
}

impl<T, K: fmt::Debug> fmt::Debug for KeyIndex<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("KeyIndex")
            .field("table", &self.table)
            .field("keys", &state.entries.len())
            .field("next_slot", &state.next_slot)
            .field("dirty", &state.dirty)
            .finish()
    }
}
