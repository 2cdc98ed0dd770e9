//! Application setup and initialization
//!
//! Startup is split into small steps so tests can assemble the same router against a
//! temporary storage directory and a fixed address provider.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use lanshare_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_json);

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;

    let address = services::address_provider(&config);
    let state = services::build_state(&config, storage, address);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
