//! Cache Store Module
//!
//! In-memory store mapping cache keys to captured response bodies, with
//! lazy TTL expiration on lookup and eager expiration via `delete_expired`.

use std::collections::HashMap;

use bytes::Bytes;

use crate::cache::{CacheEntry, CacheStats};

/// Per-entry diagnostic summary for the status endpoint.
#[derive(Debug, Clone)]
pub struct EntryDiagnostics {
    pub key: String,
    pub body_bytes: usize,
    pub age_secs: u64,
    pub ttl_remaining_secs: u64,
}

// == Cache Store ==
/// Main cache storage keyed by request identity.
///
/// The store itself is synchronous; callers share it behind a single
/// `Arc<RwLock<..>>` so every lookup and mutation is whole-store exclusive.
#[derive(Debug)]
pub struct CacheStore {
    /// Captured responses by cache key
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new empty CacheStore.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
        }
    }

    // == Get ==
    /// Looks up a key and returns the stored body if present and live.
    ///
    /// An expired entry is treated as absent; physical removal is left to
    /// the sweeper, so stale bytes are never returned but the scan cost is
    /// not paid on the request path.
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                Some(entry.body.clone())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Inserts or replaces the entry for `key`, capturing it now.
    ///
    /// Returns the stored entry so callers can mirror the exact capture
    /// time to a durable backend.
    pub fn put(&mut self, key: String, body: Bytes, ttl_secs: u64) -> CacheEntry {
        let entry = CacheEntry::new(body, ttl_secs);
        self.entries.insert(key, entry.clone());
        self.stats.set_total_entries(self.entries.len());
        entry
    }

    // == Insert Loaded ==
    /// Inserts an entry rebuilt from the durable mirror, preserving its
    /// original capture time. Replaces any existing entry for the key.
    pub fn insert_loaded(&mut self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete Expired ==
    /// Removes every expired entry, returning the removed keys.
    pub fn delete_expired(&mut self) -> Vec<String> {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
        }

        self.stats.record_swept(expired_keys.len() as u64);
        self.stats.set_total_entries(self.entries.len());
        expired_keys
    }

    // == Clear All ==
    /// Removes every entry regardless of liveness and returns the count
    /// removed. Calling on an empty store is a no-op returning 0.
    pub fn clear_all(&mut self) -> usize {
        let previous = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);
        previous
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Diagnostics ==
    /// Returns a per-entry summary for operator visibility.
    pub fn diagnostics(&self) -> Vec<EntryDiagnostics> {
        self.entries
            .iter()
            .map(|(key, entry)| EntryDiagnostics {
                key: key.clone(),
                body_bytes: entry.body.len(),
                age_secs: entry.age_secs(),
                ttl_remaining_secs: entry.ttl_remaining_secs(),
            })
            .collect()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
