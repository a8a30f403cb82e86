//! API Module
//!
//! Administrative HTTP surface and shared application state.
//!
//! # Endpoints
//! - `GET/POST /clear-cache` - Empty the store, report counts
//! - `GET /cache-status` - Entry count, counters, per-entry summaries
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
