//! Lazy key handles
//!
//! A [`KeyEntry`] binds one key value to a resolver that can materialize
//! the owning entity on demand. The entry caches a `Weak` handle to the
//! last resolved entity: it never keeps an entity alive on its own, and
//! once every caller drops the entity the next access resolves again.

use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

/// Callback materializing the entity stored under a key
///
/// Returns `None` when the entity cannot be produced (missing body,
/// deserialization failure reported elsewhere).
pub type Resolver<T, K> = Arc<dyn Fn(&K) -> Option<Arc<T>> + Send + Sync>;

/// One key of a table plus a deferred way to load its entity
///
/// Equality and hashing use the key value only; two entries with equal
/// keys are interchangeable.
pub struct KeyEntry<T, K> {
    key: K,
    resolver: Resolver<T, K>,
    cached: Mutex<Weak<T>>,
}

impl<T, K> KeyEntry<T, K> {
    /// Create an unresolved entry
    pub fn new(key: K, resolver: Resolver<T, K>) -> Self {
        KeyEntry {
            key,
            resolver,
            cached: Mutex::new(Weak::new()),
        }
    }

    /// The key value
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Materialize the entity
    ///
    /// Returns the cached entity while some caller still holds it,
    /// otherwise runs the resolver and caches a weak handle to the result.
    pub fn entity(&self) -> Option<Arc<T>> {
        if let Some(entity) = self.cached.lock().upgrade() {
            return Some(entity);
        }

        // Resolve without holding the lock; the resolver may be slow or
        // re-enter the table layer.
        let entity = (self.resolver)(&self.key)?;
        *self.cached.lock() = Arc::downgrade(&entity);
        Some(entity)
    }

    /// True while a previously resolved entity is still alive
    pub fn is_resolved(&self) -> bool {
        self.cached.lock().strong_count() > 0
    }

    /// Drop the cached handle so the next access re-resolves
    pub fn refresh(&self) {
        *self.cached.lock() = Weak::new();
    }
}

impl<T, K: PartialEq> PartialEq for KeyEntry<T, K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T, K: Eq> Eq for KeyEntry<T, K> {}

impl<T, K: Hash> Hash for KeyEntry<T, K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T, K: fmt::Debug> fmt::Debug for KeyEntry<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEntry")
            .field("key", &self.key)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
