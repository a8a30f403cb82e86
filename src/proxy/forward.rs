//! Origin Client Module
//!
//! Forwards requests to the origin server and captures fully buffered
//! responses.

use std::time::Duration;

use axum::http::{header, HeaderMap, Method, StatusCode};
use bytes::Bytes;
use reqwest::{Client, Url};

use crate::error::{ProxyError, Result};

/// Headers that describe the connection rather than the payload; they are
/// stripped in both directions instead of being forwarded.
const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// A response captured from the origin, fully buffered in memory.
#[derive(Debug)]
pub struct OriginResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

// == Origin Client ==
/// HTTP client bound to the origin base URL.
#[derive(Clone)]
pub struct OriginClient {
    client: Client,
    base: Url,
}

impl OriginClient {
    // == Constructor ==
    /// Creates a client for `base` with a fixed request timeout.
    pub fn new(base: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base })
    }

    // == Fetch ==
    /// Forwards a request to the origin, unmodified except for the host
    /// rewrite and hop-by-hop header stripping, and buffers the full
    /// response body.
    pub async fn fetch(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<OriginResponse> {
        let url = self.rewrite_url(path_and_query)?;

        let response = self
            .client
            .request(method, url)
            .headers(strip_connection_headers(headers))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = strip_connection_headers(response.headers().clone());
        let body = response.bytes().await?;

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }

    // == Rewrite URL ==
    /// Rebuilds the request URL against the origin base.
    pub fn rewrite_url(&self, path_and_query: &str) -> Result<Url> {
        let raw = format!(
            "{}{}",
            self.base.as_str().trim_end_matches('/'),
            path_and_query
        );
        Url::parse(&raw)
            .map_err(|err| ProxyError::Internal(format!("rewritten origin URL invalid: {}", err)))
    }
}

/// Removes hop-by-hop headers, plus Host so the client derives it from the
/// rewritten URL.
fn strip_connection_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    headers.remove(header::HOST);
    headers
}
