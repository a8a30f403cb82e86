//! Caching Proxy - A transparent HTTP caching layer
//!
//! Forwards requests to an origin server, stores successful responses
//! keyed by request identity, and serves repeats from the store until
//! their TTL elapses.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod persist;
pub mod proxy;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheHandle;
pub use config::Config;
pub use tasks::spawn_sweep_task;
