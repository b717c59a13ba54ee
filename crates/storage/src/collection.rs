//! Type-erased view over key indices
//!
//! The table layer owns indices of many (entity, key) type pairs. The
//! [`KeyCollection`] trait exposes the lifecycle operations that don't
//! depend on the key type so they can be driven uniformly.

use crate::key_index::KeyIndex;
use async_trait::async_trait;
use slotdb_core::{IndexKey, Result, TableId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifecycle operations shared by every key index
#[async_trait]
pub trait KeyCollection: Send + Sync {
    /// Table the index covers
    fn table_id(&self) -> &TableId;

    /// True if there are unflushed mutations
    fn is_dirty(&self) -> bool;

    /// Number of keys
    fn len(&self) -> usize;

    /// True if there are no keys
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the table if dirty; true if written
    async fn flush(&self) -> Result<bool>;

    /// Flush then reload from the driver
    async fn refresh(&self) -> Result<()>;

    /// Discard pending mutations and reload from the driver
    async fn truncate(&self) -> Result<()>;
}

#[async_trait]
impl<T, K> KeyCollection for KeyIndex<T, K>
where
    T: Send + Sync + 'static,
    K: IndexKey,
{
    fn table_id(&self) -> &TableId {
        KeyIndex::table_id(self)
    }

    fn is_dirty(&self) -> bool {
        KeyIndex::is_dirty(self)
    }

    fn len(&self) -> usize {
        KeyIndex::len(self)
    }

    async fn flush(&self) -> Result<bool> {
        KeyIndex::flush(self).await
    }

    async fn refresh(&self) -> Result<()> {
        KeyIndex::refresh(self).await
    }

    async fn truncate(&self) -> Result<()> {
        KeyIndex::truncate(self).await
    }
}

/// Flush every index in `collections`, in order
///
/// Returns how many tables were written. Stops at the first failure; the
/// failed index and the ones after it stay dirty.
pub async fn flush_all(collections: &[Arc<dyn KeyCollection>]) -> Result<usize> {
    let mut written = 0;
    for collection in collections {
        match collection.flush().await {
            Ok(true) => written += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(
                    target: "slotdb::keys",
                    table = %collection.table_id(),
                    error = %e,
                    "Flush of key indices aborted"
                );
                return Err(e);
            }
        }
    }
    debug!(
        target: "slotdb::keys",
        indices = collections.len(),
        written,
        "Key indices flushed"
    );
    Ok(written)
}
