//! Integration Tests for the Proxying Path
//!
//! Drives the full router (admin endpoints plus proxy fallback) against a
//! stub origin server that counts how often it is contacted.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::RawQuery,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use caching_proxy::{api::create_router, proxy::OriginClient, AppState, CacheHandle};
use reqwest::Url;
use serde_json::Value;
use tower::util::ServiceExt;

// == Helper Functions ==

/// Starts a stub origin on an ephemeral port. Every handled request
/// increments the returned counter.
async fn spawn_origin() -> (SocketAddr, Arc<AtomicUsize>) {
    let requests = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route(
            "/a",
            get({
                let requests = requests.clone();
                move || {
                    let requests = requests.clone();
                    async move {
                        requests.fetch_add(1, Ordering::SeqCst);
                        "X"
                    }
                }
            }),
        )
        .route(
            "/search",
            get({
                let requests = requests.clone();
                move |RawQuery(query): RawQuery| {
                    let requests = requests.clone();
                    async move {
                        requests.fetch_add(1, Ordering::SeqCst);
                        query.unwrap_or_default()
                    }
                }
            }),
        )
        .route(
            "/fail",
            get({
                let requests = requests.clone();
                move || {
                    let requests = requests.clone();
                    async move {
                        requests.fetch_add(1, Ordering::SeqCst);
                        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, requests)
}

/// Builds a proxy router forwarding to the given origin address.
fn proxy_app(origin: SocketAddr, default_ttl: u64) -> Router {
    let base = Url::parse(&format!("http://{}", origin)).unwrap();
    let origin_client = OriginClient::new(base).unwrap();
    let state = AppState::new(CacheHandle::new(None), origin_client, default_ttl);
    create_router(state)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let marker = response
        .headers()
        .get("x-cache")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, marker, String::from_utf8_lossy(&bytes).to_string())
}

// == Hit/Miss Tests ==

#[tokio::test]
async fn test_miss_then_hit_with_identical_bodies() {
    let (origin, requests) = spawn_origin().await;
    let app = proxy_app(origin, 60);

    let (status, marker, body) = send(&app, "GET", "/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marker.as_deref(), Some("Miss"));
    assert_eq!(body, "X");

    let (status, marker, body) = send(&app, "GET", "/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marker.as_deref(), Some("Hit"));
    assert_eq!(body, "X");

    // The second request never reached the origin
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_string_distinguishes_cached_resources() {
    let (origin, requests) = spawn_origin().await;
    let app = proxy_app(origin, 60);

    let (_, marker, body) = send(&app, "GET", "/search?q=rust").await;
    assert_eq!(marker.as_deref(), Some("Miss"));
    assert_eq!(body, "q=rust");

    let (_, marker, body) = send(&app, "GET", "/search?q=go").await;
    assert_eq!(marker.as_deref(), Some("Miss"));
    assert_eq!(body, "q=go");

    assert_eq!(requests.load(Ordering::SeqCst), 2);

    // Repeating the first query serves the stored copy
    let (_, marker, body) = send(&app, "GET", "/search?q=rust").await;
    assert_eq!(marker.as_deref(), Some("Hit"));
    assert_eq!(body, "q=rust");
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_non_success_responses_are_relayed_but_not_cached() {
    let (origin, requests) = spawn_origin().await;
    let app = proxy_app(origin, 60);

    let (status, marker, body) = send(&app, "GET", "/fail").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(marker.as_deref(), Some("Miss"));
    assert_eq!(body, "boom");

    let (status, marker, _) = send(&app, "GET", "/fail").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(marker.as_deref(), Some("Miss"));

    // Both requests went through to the origin
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let (origin, requests) = spawn_origin().await;
    let app = proxy_app(origin, 1);

    let (_, marker, _) = send(&app, "GET", "/a").await;
    assert_eq!(marker.as_deref(), Some("Miss"));

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (_, marker, body) = send(&app, "GET", "/a").await;
    assert_eq!(marker.as_deref(), Some("Miss"));
    assert_eq!(body, "X");
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

// == Origin Failure Tests ==

#[tokio::test]
async fn test_unreachable_origin_returns_bad_gateway() {
    // Reserve a port, then close it so connections are refused
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = proxy_app(addr, 60);

    let (status, _, body) = send(&app, "GET", "/a").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json.get("error").is_some());
}

// == Administrative Endpoint Tests ==

#[tokio::test]
async fn test_clear_cache_endpoint_forces_refetch() {
    let (origin, requests) = spawn_origin().await;
    let app = proxy_app(origin, 60);

    let (_, marker, _) = send(&app, "GET", "/a").await;
    assert_eq!(marker.as_deref(), Some("Miss"));

    let (status, _, body) = send(&app, "POST", "/clear-cache").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["cleared"].as_u64().unwrap(), 1);
    assert_eq!(json["remaining"].as_u64().unwrap(), 0);

    let (_, marker, _) = send(&app, "GET", "/a").await;
    assert_eq!(marker.as_deref(), Some("Miss"));
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_status_reports_entries() {
    let (origin, _) = spawn_origin().await;
    let app = proxy_app(origin, 60);

    let _ = send(&app, "GET", "/a").await;

    let (status, _, body) = send(&app, "GET", "/cache-status").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["entries"][0]["key"].as_str().unwrap(), "GET /a");
    assert_eq!(json["entries"][0]["body_bytes"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn test_health_endpoint_is_not_proxied() {
    let (origin, requests) = spawn_origin().await;
    let app = proxy_app(origin, 60);

    let (status, _, body) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert_eq!(requests.load(Ordering::SeqCst), 0);
}
