//! Server startup and graceful shutdown

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use lanshare_core::{format_file_size, Config};

use crate::state::AppState;

/// Bind, announce the shareable address, run the sweeper and serve until a shutdown signal.
pub async fn start_server(config: &Config, state: Arc<AppState>, app: Router) -> Result<()> {
    let addr = config.socket_addr();
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        local_url = %format!("http://localhost:{}", config.port),
        network_url = %state.links.base_url(),
        storage_dir = %config.storage_dir.display(),
        max_file_size = %format_file_size(config.max_file_size_bytes),
        retention_hours = config.retention_hours,
        "Server ready and accepting connections"
    );

    let sweeper = match config.cleanup_interval() {
        Some(_) => Some(state.sweeper.clone().start()),
        None => {
            tracing::warn!("Expiration sweeper disabled; files will not expire");
            None
        }
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = sweeper {
        handle.shutdown().await;
    }

    served?;
    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
