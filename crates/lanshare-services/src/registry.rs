//! In-memory registry of live uploads

use std::collections::HashSet;
use std::sync::Arc;

use lanshare_core::{AppError, FileRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Ordered set of live file records, shared between handlers and the sweeper.
///
/// Thread-safe and async-compatible using tokio's RwLock. Every method takes the lock for
/// a single step and releases it before returning, so no lock is ever held across storage I/O.
#[derive(Clone)]
pub struct FileRegistry {
    records: Arc<RwLock<Vec<FileRecord>>>,
}

impl FileRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a record, preserving insertion order.
    ///
    /// Fails if the id or stored name is already taken by a live record.
    pub async fn append(&self, record: FileRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;

        if records
            .iter()
            .any(|r| r.id == record.id || r.stored_name == record.stored_name)
        {
            return Err(AppError::Internal(format!(
                "Record {} ({}) collides with a live record",
                record.id, record.stored_name
            )));
        }

        records.push(record);
        Ok(())
    }

    /// Snapshot of all live records in insertion order.
    pub async fn list(&self) -> Vec<FileRecord> {
        self.records.read().await.clone()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<FileRecord> {
        let records = self.records.read().await;
        records.iter().find(|r| r.id == id).cloned()
    }

    pub async fn find_by_stored_name(&self, stored_name: &str) -> Option<FileRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.stored_name == stored_name)
            .cloned()
    }

    pub async fn contains_stored_name(&self, stored_name: &str) -> bool {
        let records = self.records.read().await;
        records.iter().any(|r| r.stored_name == stored_name)
    }

    /// Remove a record by id. Returns `false` if it was already gone.
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }

    /// Rebuild the live set without the given ids and return how many were dropped.
    pub async fn remove_all(&self, ids: &HashSet<Uuid>) -> usize {
        if ids.is_empty() {
            return 0;
        }

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        before - records.len()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
