//! Proxy Module
//!
//! The forwarding decision path: cache key derivation, the origin client,
//! and the hit/miss handler.

pub mod forward;
mod handler;
mod key;

pub use forward::{OriginClient, OriginResponse};
pub use handler::proxy_handler;
pub use key::cache_key;

// == Response Markers ==
/// Header marking whether a response came from the store or the origin
pub const X_CACHE: &str = "x-cache";
/// Marker value for responses served from the store
pub const X_CACHE_HIT: &str = "Hit";
/// Marker value for responses freshly fetched from the origin
pub const X_CACHE_MISS: &str = "Miss";
