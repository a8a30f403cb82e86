//! Cache Handle Module
//!
//! The shared, cloneable facade over the cache store that request handlers,
//! the sweeper, and the admin endpoints all talk to. Selecting memory-only
//! or memory-plus-durable-mirror happens here, so callers never know which
//! backing is active.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore, EntryDiagnostics};
use crate::persist::PersistStore;

// == Cache Handle ==
/// Thread-safe cache facade.
///
/// Mutations and lookups are whole-store exclusive through a single lock;
/// durable mirroring always happens after the guard is dropped so the lock
/// is never held across I/O.
#[derive(Clone)]
pub struct CacheHandle {
    store: Arc<RwLock<CacheStore>>,
    persist: Option<PersistStore>,
}

impl CacheHandle {
    // == Constructor ==
    /// Creates a handle over a fresh store, optionally mirroring to the
    /// given durable backend.
    pub fn new(persist: Option<PersistStore>) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new())),
            persist,
        }
    }

    // == Hydrate ==
    /// Loads mirrored entries into the store. Rows that expired while the
    /// process was down are skipped and purged. Returns the number of live
    /// entries loaded.
    pub async fn hydrate(&self) -> anyhow::Result<usize> {
        let Some(persist) = &self.persist else {
            return Ok(0);
        };

        let rows = persist.load_entries().await?;
        let (expired, live): (Vec<_>, Vec<_>) =
            rows.into_iter().partition(|(_, entry)| entry.is_expired());

        let loaded = live.len();
        {
            let mut store = self.store.write().await;
            for (key, entry) in live {
                store.insert_loaded(key, entry);
            }
        }

        if !expired.is_empty() {
            let keys: Vec<String> = expired.into_iter().map(|(key, _)| key).collect();
            debug!(purged = keys.len(), "purging entries that expired while down");
            if let Err(error) = persist.delete_keys(keys).await {
                warn!(%error, "failed to purge expired mirrored entries");
            }
        }

        Ok(loaded)
    }

    // == Get ==
    /// Returns the stored body for `key` if present and live.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.store.write().await.get(key)
    }

    // == Put ==
    /// Inserts or replaces the entry for `key`. The mirror write is
    /// best-effort: a failure is logged and the in-memory put stands.
    pub async fn put(&self, key: String, body: Bytes, ttl_secs: u64) {
        let entry = {
            let mut store = self.store.write().await;
            store.put(key.clone(), body, ttl_secs)
        };

        if let Some(persist) = &self.persist {
            if let Err(error) = persist.store_entry(key, entry).await {
                warn!(%error, "failed to mirror cache entry");
            }
        }
    }

    // == Delete Expired ==
    /// Eagerly removes every expired entry, returning the count removed.
    pub async fn delete_expired(&self) -> usize {
        let removed = {
            let mut store = self.store.write().await;
            store.delete_expired()
        };
        let count = removed.len();

        if count > 0 {
            if let Some(persist) = &self.persist {
                if let Err(error) = persist.delete_keys(removed).await {
                    warn!(%error, "failed to delete mirrored expired entries");
                }
            }
        }

        count
    }

    // == Clear All ==
    /// Empties the store regardless of liveness, returning the prior count.
    pub async fn clear_all(&self) -> usize {
        let previous = {
            let mut store = self.store.write().await;
            store.clear_all()
        };

        if let Some(persist) = &self.persist {
            if let Err(error) = persist.clear().await {
                warn!(%error, "failed to clear mirrored cache");
            }
        }

        previous
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    // == Diagnostics ==
    /// Returns per-entry summaries for the status endpoint.
    pub async fn diagnostics(&self) -> Vec<EntryDiagnostics> {
        self.store.read().await.diagnostics()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}
