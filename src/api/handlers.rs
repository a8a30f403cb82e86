//! API Handlers
//!
//! HTTP request handlers for the administrative endpoints, plus the shared
//! application state.

use axum::{extract::State, Json};
use tracing::info;

use crate::cache::CacheHandle;
use crate::config::Config;
use crate::error::Result;
use crate::models::{ClearResponse, HealthResponse, StatusResponse};
use crate::persist::PersistStore;
use crate::proxy::OriginClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache facade (memory-only or durably mirrored)
    pub cache: CacheHandle,
    /// Client bound to the origin base URL
    pub origin: OriginClient,
    /// TTL in seconds applied to every stored response
    pub default_ttl: u64,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(cache: CacheHandle, origin: OriginClient, default_ttl: u64) -> Self {
        Self {
            cache,
            origin,
            default_ttl,
        }
    }

    /// Creates a new AppState from configuration, wiring in the durable
    /// mirror when one is configured.
    pub fn from_config(config: &Config, persist: Option<PersistStore>) -> Result<Self> {
        let cache = CacheHandle::new(persist);
        let origin = OriginClient::new(config.origin_url.clone())?;
        Ok(Self::new(cache, origin, config.default_ttl))
    }
}

/// Handler for GET/POST /clear-cache
///
/// Empties the store and reports the before/after counts. Idempotent:
/// clearing an empty store succeeds and reports 0.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.clear_all().await;
    info!(cleared, "cache cleared via admin endpoint");
    Json(ClearResponse::new(cleared))
}

/// Handler for GET /cache-status
///
/// Reports the entry count, hit/miss counters, and per-entry summaries.
/// Operator visibility only, no effect on correctness.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let stats = state.cache.stats().await;
    let entries = state.cache.diagnostics().await;
    Json(StatusResponse::new(stats, entries))
}

/// Handler for GET /health
///
/// Returns health status of the proxy.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::Url;

    fn test_state() -> AppState {
        let origin = OriginClient::new(Url::parse("http://127.0.0.1:9").unwrap()).unwrap();
        AppState::new(CacheHandle::new(None), origin, 60)
    }

    #[tokio::test]
    async fn test_clear_cache_handler_reports_count() {
        let state = test_state();
        state
            .cache
            .put("GET /foo".to_string(), Bytes::from_static(b"x"), 60)
            .await;

        let response = clear_cache_handler(State(state.clone())).await;
        assert_eq!(response.cleared, 1);
        assert_eq!(state.cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_clear_cache_handler_idempotent() {
        let state = test_state();

        let first = clear_cache_handler(State(state.clone())).await;
        let second = clear_cache_handler(State(state)).await;
        assert_eq!(first.cleared, 0);
        assert_eq!(second.cleared, 0);
    }

    #[tokio::test]
    async fn test_status_handler_lists_entries() {
        let state = test_state();
        state
            .cache
            .put("GET /foo".to_string(), Bytes::from_static(b"hello"), 60)
            .await;

        let response = status_handler(State(state)).await;
        assert_eq!(response.total_entries, 1);
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.entries[0].key, "GET /foo");
        assert_eq!(response.entries[0].body_bytes, 5);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
