//! Caching Proxy - A transparent HTTP caching layer
//!
//! Forwards requests to an origin server, stores successful responses,
//! and serves repeats from the store until their TTL elapses.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod persist;
mod proxy;
mod tasks;

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::{AdminConfig, Config};
use persist::PersistStore;
use tasks::spawn_sweep_task;

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Handle the one-shot `--clear-cache` command, if requested
/// 3. Load and validate configuration from environment variables
/// 4. Open the durable mirror (when configured), record the listening
///    port, and hydrate the store from surviving entries
/// 5. Start the background expiration sweeper (when an interval is set)
/// 6. Create the Axum router: admin endpoints plus the proxy fallback
/// 7. Start the HTTP server on the configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caching_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The clear command runs against an already-running instance and does
    // not need a full (origin-validated) configuration
    if std::env::args().any(|arg| arg == "--clear-cache") {
        return run_clear_command().await;
    }

    info!("Starting caching proxy");

    // Load configuration; invalid or missing values are fatal here
    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Configuration loaded: port={}, origin={}, default_ttl={}s, sweep_interval={}s, db={}",
        config.server_port,
        config.origin_url,
        config.default_ttl,
        config.sweep_interval,
        config.db_path.as_deref().unwrap_or("disabled"),
    );

    // Open the durable mirror when configured
    let persist = match &config.db_path {
        Some(path) => Some(PersistStore::open(path).context("failed to open cache database")?),
        None => None,
    };

    // Create application state with the cache facade and origin client
    let state = AppState::from_config(&config, persist.clone())?;

    if let Some(persist) = &persist {
        // Record where we listen so the out-of-process clear command can
        // find this instance
        if let Err(error) = persist.set_port(config.server_port).await {
            warn!(%error, "failed to record listening port");
        }

        match state.cache.hydrate().await {
            Ok(loaded) => info!(loaded, "hydrated cache from durable store"),
            Err(error) => warn!(%error, "failed to hydrate cache from durable store"),
        }
    }

    // Start the background sweeper; interval 0 means lazy expiration only
    let sweep_handle = if config.sweep_interval > 0 {
        Some(spawn_sweep_task(state.cache.clone(), config.sweep_interval))
    } else {
        info!("Expiration sweeper disabled, relying on lazy expiration");
        None
    };

    // Create router with admin endpoints and the proxy fallback
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(
        "Proxy listening on http://{} forwarding to {}",
        addr, config.origin_url
    );

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server failed")?;

    info!("Proxy shutdown complete");
    Ok(())
}

/// Clears the cache of a running instance by posting to its admin
/// endpoint. The instance's port comes from the durable configuration
/// record when available, falling back to the configured port.
async fn run_clear_command() -> anyhow::Result<()> {
    let config = AdminConfig::from_env().context("invalid configuration")?;

    let port = match &config.db_path {
        Some(path) => PersistStore::open(path)?
            .get_port()
            .await?
            .unwrap_or(config.server_port),
        None => config.server_port,
    };

    let url = format!("http://127.0.0.1:{}/clear-cache", port);
    let response = reqwest::Client::new()
        .post(&url)
        .send()
        .await
        .with_context(|| format!("no caching proxy reachable on port {}", port))?;
    let body = response.text().await.context("failed to read response")?;

    println!("{}", body);
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweeper and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the sweeper
    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweeper task aborted");
    }
}
