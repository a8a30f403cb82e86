//! Forwarding Handler Module
//!
//! The fallback handler implementing the serve-from-store vs
//! forward-and-populate decision for every proxied request.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::api::AppState;
use crate::error::{ProxyError, Result};
use crate::proxy::forward::OriginResponse;
use crate::proxy::key::cache_key;
use crate::proxy::{X_CACHE, X_CACHE_HIT, X_CACHE_MISS};

/// Handler for every request not claimed by an admin route.
///
/// Hits are served from the store verbatim. Misses are forwarded to the
/// origin; the response is fully buffered, relayed to the client, and
/// stored when the origin reported success. Failed fetches reach the
/// client as errors and never touch the store.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let key = cache_key(&parts.method, &parts.uri);

    if let Some(stored) = state.cache.get(&key).await {
        debug!(%key, "serving from cache");
        return hit_response(stored);
    }

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned());

    let request_body = to_bytes(body, usize::MAX)
        .await
        .map_err(|err| ProxyError::Internal(format!("failed to read request body: {}", err)))?;

    debug!(%key, "forwarding to origin");
    let origin = state
        .origin
        .fetch(parts.method, &path_and_query, parts.headers, request_body)
        .await?;

    // Only successful responses are worth replaying; errors are relayed
    // but never cached.
    if origin.status.is_success() {
        state
            .cache
            .put(key.clone(), origin.body.clone(), state.default_ttl)
            .await;
        info!(%key, status = %origin.status, "stored origin response");
    } else {
        info!(%key, status = %origin.status, "relaying non-success response uncached");
    }

    miss_response(origin)
}

/// Builds the response for a cache hit: the stored body verbatim.
fn hit_response(body: Bytes) -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(X_CACHE, X_CACHE_HIT)
        .body(Body::from(body))
        .map_err(|err| ProxyError::Internal(format!("failed to build hit response: {}", err)))
}

/// Relays a freshly fetched origin response with the miss marker attached.
fn miss_response(origin: OriginResponse) -> Result<Response> {
    let mut response = Response::builder()
        .status(origin.status)
        .body(Body::from(origin.body))
        .map_err(|err| ProxyError::Internal(format!("failed to build miss response: {}", err)))?;

    *response.headers_mut() = origin.headers;
    response.headers_mut().insert(
        HeaderName::from_static(X_CACHE),
        HeaderValue::from_static(X_CACHE_MISS),
    );
    Ok(response)
}
