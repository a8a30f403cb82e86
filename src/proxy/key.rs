//! Cache Key Module
//!
//! Derives the cache key identifying a request.

use axum::http::{Method, Uri};

/// Derives the cache key for a request: method and full path including the
/// query string, case-sensitive, no normalization. Two URLs differing only
/// in query parameters are different resources.
pub fn cache_key(method: &Method, uri: &Uri) -> String {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{} {}", method, path_and_query)
}
