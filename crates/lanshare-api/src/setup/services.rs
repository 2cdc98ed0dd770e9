//! Service wiring

use std::sync::Arc;
use std::time::Duration;

use lanshare_core::constants::CLEANUP_INTERVAL_SECS;
use lanshare_core::Config;
use lanshare_services::{
    AddressProvider, DeletionService, DownloadResolver, ExpirationSweeper, FileRegistry,
    IngestionService, LanAddressProvider, Latin1Utf8Repair, LinkGenerator, QrCodeEncoder,
    StaticAddressProvider,
};
use lanshare_storage::Storage;

use crate::state::AppState;

/// `PUBLIC_HOST` pins the host used in links; otherwise the LAN address is discovered.
pub fn address_provider(config: &Config) -> Arc<dyn AddressProvider> {
    match &config.public_host {
        Some(host) => {
            tracing::info!(public_host = %host, "Using configured public host for links");
            Arc::new(StaticAddressProvider::new(host.clone()))
        }
        None => Arc::new(LanAddressProvider),
    }
}

pub fn build_state(
    config: &Config,
    storage: Arc<dyn Storage>,
    address: Arc<dyn AddressProvider>,
) -> Arc<AppState> {
    let registry = FileRegistry::new();

    let links = LinkGenerator::new(address, Arc::new(QrCodeEncoder::default()), config.port);

    let ingestion = IngestionService::new(
        registry.clone(),
        storage.clone(),
        links.clone(),
        Arc::new(Latin1Utf8Repair),
        config.max_file_size_bytes,
    );
    let downloads = DownloadResolver::new(registry.clone(), storage.clone());
    let deletions = DeletionService::new(registry.clone(), storage.clone());

    // The sweeper is always constructed; `start_server` decides whether to run it.
    let sweeper = Arc::new(ExpirationSweeper::new(
        registry.clone(),
        storage,
        config.retention(),
        config
            .cleanup_interval()
            .unwrap_or(Duration::from_secs(CLEANUP_INTERVAL_SECS)),
    ));

    Arc::new(AppState {
        config: config.clone(),
        registry,
        links,
        ingestion,
        downloads,
        deletions,
        sweeper,
    })
}
