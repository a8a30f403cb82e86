//! Cache Entry Module
//!
//! Defines the structure for individual cached responses with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

// == Cache Entry ==
/// A single cached response body with its capture metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The response body captured at cache time
    pub body: Bytes,
    /// Capture timestamp (Unix milliseconds)
    pub created_at: u64,
    /// TTL in seconds, fixed at capture time and never refreshed on hit
    pub ttl_secs: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry captured now.
    pub fn new(body: Bytes, ttl_secs: u64) -> Self {
        Self {
            body,
            created_at: current_timestamp_ms(),
            ttl_secs,
        }
    }

    /// Reassembles an entry from stored parts, preserving its original
    /// capture time. Used when hydrating from the durable mirror.
    pub fn from_parts(body: Bytes, created_at: u64, ttl_secs: u64) -> Self {
        Self {
            body,
            created_at,
            ttl_secs,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is live while `now - created_at < ttl`; it is expired the
    /// instant the full TTL has elapsed. The lazy lookup path and the
    /// background sweep both go through this predicate, so the two can never
    /// disagree about liveness.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at_ms()
    }

    /// Returns the entry's age in whole seconds.
    pub fn age_secs(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at) / 1000
    }

    /// Returns remaining TTL in whole seconds, 0 once expired.
    pub fn ttl_remaining_secs(&self) -> u64 {
        self.expires_at_ms()
            .saturating_sub(current_timestamp_ms())
            / 1000
    }

    fn expires_at_ms(&self) -> u64 {
        self.created_at
            .saturating_add(self.ttl_secs.saturating_mul(1000))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
