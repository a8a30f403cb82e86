//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the caching proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Invalid or missing configuration, fatal at startup
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The origin fetch failed (network error, timeout)
    #[error("Origin fetch failed: {0}")]
    Origin(#[from] reqwest::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // A failed origin fetch is surfaced to the client; the store is
            // never mutated on this path.
            ProxyError::Origin(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            ProxyError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ProxyError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
