//! Response DTOs for the administrative API
//!
//! Defines the structure of outgoing HTTP response bodies for the admin
//! endpoints; proxied responses pass through untouched.

use serde::Serialize;

use crate::cache::{CacheStats, EntryDiagnostics};

/// Response body for the clear operation (GET/POST /clear-cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Human-readable confirmation
    pub message: String,
    /// Number of entries removed
    pub cleared: usize,
    /// Entries left after clearing (always 0)
    pub remaining: usize,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new(cleared: usize) -> Self {
        let message = if cleared == 0 {
            "Cache was already empty".to_string()
        } else {
            format!("Cleared {} cached entries", cleared)
        };
        Self {
            message,
            cleared,
            remaining: 0,
        }
    }
}

/// Per-entry diagnostic summary in the status report
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    /// Cache key (method and full URL)
    pub key: String,
    /// Stored body length in bytes
    pub body_bytes: usize,
    /// Seconds since capture
    pub age_secs: u64,
    /// Seconds of TTL left, 0 once stale
    pub ttl_remaining_secs: u64,
}

impl From<EntryDiagnostics> for EntrySummary {
    fn from(diagnostics: EntryDiagnostics) -> Self {
        Self {
            key: diagnostics.key,
            body_bytes: diagnostics.body_bytes,
            age_secs: diagnostics.age_secs,
            ttl_remaining_secs: diagnostics.ttl_remaining_secs,
        }
    }
}

/// Response body for the status endpoint (GET /cache-status)
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Number of lookups served from the store
    pub hits: u64,
    /// Number of lookups forwarded to the origin
    pub misses: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Entries removed by expiration sweeps so far
    pub swept: u64,
    /// Per-entry diagnostics
    pub entries: Vec<EntrySummary>,
    /// Report timestamp in ISO 8601 format
    pub timestamp: String,
}

impl StatusResponse {
    /// Creates a new StatusResponse from cache statistics and diagnostics
    pub fn new(stats: CacheStats, entries: Vec<EntryDiagnostics>) -> Self {
        Self {
            total_entries: stats.total_entries,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            swept: stats.swept,
            entries: entries.into_iter().map(EntrySummary::from).collect(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
