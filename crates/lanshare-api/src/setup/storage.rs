//! Storage setup and initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use lanshare_core::Config;
use lanshare_storage::{LocalStorage, Storage};

/// Create the upload directory if needed and return the storage backend.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");

    let storage = LocalStorage::new(&config.storage_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to prepare storage directory {}",
                config.storage_dir.display()
            )
        })?;

    tracing::info!(
        backend = %storage.describe(),
        "Storage initialized successfully"
    );

    Ok(Arc::new(storage))
}
