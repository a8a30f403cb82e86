//! API Routes
//!
//! Configures the Axum router: the administrative endpoints claim their
//! reserved paths, everything else falls through to the forwarding handler.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{clear_cache_handler, health_handler, status_handler, AppState};
use crate::proxy::proxy_handler;

/// Creates the main router.
///
/// # Endpoints
/// - `GET/POST /clear-cache` - Empty the store, report counts
/// - `GET /cache-status` - Entry count, counters, per-entry summaries
/// - `GET /health` - Health check endpoint
/// - anything else - forwarded through the cache to the origin
///
/// The admin paths shadow same-named origin resources; they are the
/// proxy's reserved namespace.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/clear-cache",
            get(clear_cache_handler).post(clear_cache_handler),
        )
        .route("/cache-status", get(status_handler))
        .route("/health", get(health_handler))
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
