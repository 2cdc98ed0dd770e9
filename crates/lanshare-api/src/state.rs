//! Application state shared by all handlers

use std::sync::Arc;

use lanshare_core::Config;
use lanshare_services::{
    DeletionService, DownloadResolver, ExpirationSweeper, FileRegistry, IngestionService,
    LinkGenerator,
};

pub struct AppState {
    pub config: Config,
    pub registry: FileRegistry,
    pub links: LinkGenerator,
    pub ingestion: IngestionService,
    pub downloads: DownloadResolver,
    pub deletions: DeletionService,
    pub sweeper: Arc<ExpirationSweeper>,
}

impl AppState {
    pub fn retention(&self) -> chrono::Duration {
        self.config.retention()
    }
}
