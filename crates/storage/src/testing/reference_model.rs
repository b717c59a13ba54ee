//! Reference model for key index testing
//!
//! A deliberately naive model of what a key index should contain after a
//! sequence of operations. Used by property tests to compare against the
//! real [`KeyIndex`](crate::KeyIndex).

use crate::key_index::KeyIndex;
use slotdb_core::{IndexKey, SlotIndex};
use std::collections::HashMap;
use std::fmt::Debug;

/// Operation applied to both the model and the real index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<K> {
    /// Add a key (or refresh it if present)
    Add(K),
    /// Remove a key
    Remove(K),
    /// Flush pending mutations
    Flush,
    /// Flush, then reload from the driver
    Refresh,
    /// Discard pending mutations and reload from the driver
    Truncate,
}

/// Expected state of a key index
#[derive(Debug, Clone)]
pub struct ReferenceModel<K> {
    /// Keys in insertion order
    pub order: Vec<K>,
    /// Slot bound to each present key
    pub slots: HashMap<K, SlotIndex>,
    /// Every slot ever handed out
    pub issued: Vec<SlotIndex>,
    /// Next slot to hand out
    pub next_slot: SlotIndex,
    /// Unflushed mutations exist
    pub dirty: bool,
    /// Bindings as last written to the driver
    pub persisted: HashMap<K, SlotIndex>,
}

impl<K: IndexKey> Default for ReferenceModel<K> {
    fn default() -> Self {
        ReferenceModel {
            order: Vec::new(),
            slots: HashMap::new(),
            issued: Vec::new(),
            next_slot: 0,
            dirty: false,
            persisted: HashMap::new(),
        }
    }
}

impl<K: IndexKey> ReferenceModel<K> {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operation, returning the slot for `Add`
    pub fn apply(&mut self, op: &Operation<K>) -> Option<SlotIndex> {
        match op {
            Operation::Add(key) => Some(self.add(key.clone())),
            Operation::Remove(key) => {
                self.remove(key);
                None
            }
            Operation::Flush => {
                self.flush();
                None
            }
            Operation::Refresh => {
                self.refresh();
                None
            }
            Operation::Truncate => {
                self.truncate();
                None
            }
        }
    }

    /// Write pending mutations to the modelled driver
    pub fn flush(&mut self) {
        if self.dirty {
            self.persisted = self.slots.clone();
            self.dirty = false;
        }
    }

    /// Flush, then reload; the slot counter never moves backwards
    pub fn refresh(&mut self) {
        self.flush();
        self.reload();
    }

    /// Drop pending mutations and reload; the counter restarts
    pub fn truncate(&mut self) {
        self.reload();
        self.next_slot = self
            .persisted
            .values()
            .max()
            .map_or(0, |slot| slot + 1);
    }

    fn reload(&mut self) {
        let mut bindings: Vec<(K, SlotIndex)> = self
            .persisted
            .iter()
            .map(|(key, slot)| (key.clone(), *slot))
            .collect();
        bindings.sort_by_key(|(_, slot)| *slot);

        self.order = bindings.iter().map(|(key, _)| key.clone()).collect();
        self.slots = bindings.into_iter().collect();
        self.dirty = false;
    }

    /// Add a key
    pub fn add(&mut self, key: K) -> SlotIndex {
        if let Some(slot) = self.slots.get(&key) {
            return *slot;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.issued.push(slot);
        self.order.push(key.clone());
        self.slots.insert(key, slot);
        self.dirty = true;
        slot
    }

    /// Remove a key, returning true if it was present
    pub fn remove(&mut self, key: &K) -> bool {
        if self.slots.remove(key).is_none() {
            return false;
        }
        self.order.retain(|k| k != key);
        self.dirty = true;
        true
    }

    /// Compare with a real index
    pub fn compare<T>(&self, index: &KeyIndex<T, K>) -> Vec<StateMismatch>
    where
        T: Send + Sync + 'static,
    {
        let mut mismatches = Vec::new();

        let actual: Vec<K> = index.query().iter().map(|e| e.key().clone()).collect();
        if actual != self.order {
            mismatches.push(StateMismatch::new(
                "order",
                format!("{:?}", self.order),
                format!("{:?}", actual),
            ));
        }

        for (key, slot) in &self.slots {
            let actual = index.get_index_for_key(key);
            if actual != Some(*slot) {
                mismatches.push(StateMismatch::new(
                    format!("slot of {:?}", key),
                    format!("{:?}", Some(*slot)),
                    format!("{:?}", actual),
                ));
            }
        }

        if index.next_slot() != self.next_slot {
            mismatches.push(StateMismatch::new(
                "next_slot",
                self.next_slot.to_string(),
                index.next_slot().to_string(),
            ));
        }

        if index.is_dirty() != self.dirty {
            mismatches.push(StateMismatch::new(
                "dirty",
                self.dirty.to_string(),
                index.is_dirty().to_string(),
            ));
        }

        mismatches
    }
}

/// One difference between the model and the real index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMismatch {
    /// What was compared
    pub field: String,
    /// Value in the model
    pub expected: String,
    /// Value in the index
    pub actual: String,
}

impl StateMismatch {
    fn new(field: impl Into<String>, expected: String, actual: String) -> Self {
        StateMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}

impl std::fmt::Display for StateMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Assert that `index` matches `model`, listing every mismatch on failure
pub fn assert_matches_model<T, K>(model: &ReferenceModel<K>, index: &KeyIndex<T, K>)
where
    T: Send + Sync + 'static,
    K: IndexKey + Debug,
{
    let mismatches = model.compare(index);
    if !mismatches.is_empty() {
        let lines: Vec<String> = mismatches.iter().map(|m| m.to_string()).collect();
        panic!("key index diverged from model:\n  {}", lines.join("\n  "));
    }
}
