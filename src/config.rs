//! Configuration Module
//!
//! Handles loading and validating server configuration from environment variables.

use std::env;

use reqwest::Url;

use crate::error::{ProxyError, Result};

/// Caching proxy configuration parameters.
///
/// All values are read from environment variables. A missing optional value
/// falls back to its default; a present but unparsable value is fatal.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the proxy listens on
    pub server_port: u16,
    /// Base URL of the origin server requests are forwarded to
    pub origin_url: Url,
    /// TTL in seconds applied to every stored response
    pub default_ttl: u64,
    /// Expiration sweep interval in seconds (0 disables the sweeper)
    pub sweep_interval: u64,
    /// Path to the SQLite mirror (unset = memory-only cache)
    pub db_path: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PROXY_PORT` - Listening port (default: 3000)
    /// - `ORIGIN_URL` - Origin base URL, required, absolute http/https
    /// - `DEFAULT_TTL` - TTL in seconds for stored responses (default: 60)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds, 0 disables (default: 0)
    /// - `CACHE_DB` - SQLite file path; unset disables persistence
    pub fn from_env() -> Result<Self> {
        let origin_raw = env::var("ORIGIN_URL")
            .map_err(|_| ProxyError::Config("ORIGIN_URL must be set".to_string()))?;
        let origin_url = parse_origin(&origin_raw)?;

        Ok(Self {
            server_port: parse_var("PROXY_PORT", 3000)?,
            origin_url,
            default_ttl: parse_var("DEFAULT_TTL", 60)?,
            sweep_interval: parse_var("SWEEP_INTERVAL", 0)?,
            db_path: env::var("CACHE_DB").ok().filter(|path| !path.is_empty()),
        })
    }
}

/// Subset of the configuration needed by the out-of-process clear command,
/// which must work without an `ORIGIN_URL`.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Port the running instance is assumed to listen on
    pub server_port: u16,
    /// Path to the SQLite mirror holding the recorded port, if any
    pub db_path: Option<String>,
}

impl AdminConfig {
    /// Loads the admin-command configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_port: parse_var("PROXY_PORT", 3000)?,
            db_path: env::var("CACHE_DB").ok().filter(|path| !path.is_empty()),
        })
    }
}

/// Parses an optional numeric environment variable, failing on garbage input.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ProxyError::Config(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

/// Validates the origin base URL: absolute, http or https, with a host.
fn parse_origin(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|err| ProxyError::Config(format!("ORIGIN_URL is not a valid URL: {}", err)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ProxyError::Config(format!(
            "ORIGIN_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ProxyError::Config("ORIGIN_URL has no host".to_string()));
    }

    Ok(url)
}
