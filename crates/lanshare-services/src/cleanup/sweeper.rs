use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lanshare_storage::Storage;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::registry::FileRegistry;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Periodically removes uploads older than the retention window.
pub struct ExpirationSweeper {
    registry: FileRegistry,
    storage: Arc<dyn Storage>,
    retention: chrono::Duration,
    period: Duration,
    running: Mutex<()>,
}

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the loop and wait for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Expiration sweeper task panicked");
        }
    }
}

impl ExpirationSweeper {
    pub fn new(
        registry: FileRegistry,
        storage: Arc<dyn Storage>,
        retention: chrono::Duration,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            storage,
            retention,
            period,
            running: Mutex::new(()),
        }
    }

    /// Start the background sweep loop. The first sweep runs one period after start.
    pub fn start(self: Arc<Self>) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(
                period_secs = self.period.as_secs(),
                retention_hours = self.retention.num_hours(),
                "Expiration sweeper started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep().await;
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Expiration sweeper shutting down");
                        break;
                    }
                }
            }
        });

        SweeperHandle { shutdown_tx, join }
    }

    pub async fn sweep(&self) -> Option<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// Remove every record older than the retention window as of `now`.
    ///
    /// Returns `None` when another sweep is already running. A record whose payload could not
    /// be deleted stays registered so the next sweep retries it.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "expire"))]
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Option<SweepReport> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::debug!("Sweep already in progress, skipping");
            return None;
        };

        let expired: Vec<_> = self
            .registry
            .list()
            .await
            .into_iter()
            .filter(|r| r.is_expired(now, self.retention))
            .collect();

        let mut report = SweepReport {
            expired: expired.len(),
            ..SweepReport::default()
        };
        if expired.is_empty() {
            tracing::debug!("No expired files");
            return Some(report);
        }

        let mut doomed = HashSet::with_capacity(expired.len());
        for record in &expired {
            tracing::info!(
                file_id = %record.id,
                stored_name = %record.stored_name,
                uploaded_at = %record.uploaded_at,
                "Deleting expired file"
            );

            match self.storage.delete(&record.stored_name).await {
                Ok(_) => {
                    doomed.insert(record.id);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        error = %e,
                        file_id = %record.id,
                        stored_name = %record.stored_name,
                        "Failed to delete file from storage, continuing"
                    );
                }
            }
        }

        report.removed = self.registry.remove_all(&doomed).await;

        tracing::info!(
            expired = report.expired,
            removed = report.removed,
            failed = report.failed,
            "Expiration sweep completed"
        );

        Some(report)
    }
}
