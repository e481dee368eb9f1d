//! Encore Server - REST API for the curated keyword index
//!
//! Exposes encore-core over HTTP:
//! - GET /curated-index/{albumId} - Verify an album's curated keywords
//! - GET /smug/... - SmugMug folder resolution and pass-through routes

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use encore_core::SmugMugClient;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use encore_server::{create_router_with_config, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_server=info,encore_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let source = SmugMugClient::from_env().context("Failed to configure SmugMug client")?;

    info!(
        cache_dir = %config.cache_dir.display(),
        ttl_ms = config.curated_index_ttl_ms,
        concurrency = config.detail_concurrency,
        "Starting Encore server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = AppState::new(Arc::new(source), &config);
    let app = create_router_with_config(state, &config);

    let addr = config.socket_addr();
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    // ConnectInfo is required by the rate limiter's peer IP key extractor
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
