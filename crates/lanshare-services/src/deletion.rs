//! Explicit deletion by record id

use std::sync::Arc;

use lanshare_core::{AppError, FileRecord};
use lanshare_storage::Storage;
use uuid::Uuid;

use crate::registry::FileRegistry;

#[derive(Clone)]
pub struct DeletionService {
    registry: FileRegistry,
    storage: Arc<dyn Storage>,
}

impl DeletionService {
    pub fn new(registry: FileRegistry, storage: Arc<dyn Storage>) -> Self {
        Self { registry, storage }
    }

    /// Remove a file's payload and record. An already-missing payload is not an error; a
    /// failed payload delete leaves the record in place.
    #[tracing::instrument(skip(self), fields(delete.operation = "delete"))]
    pub async fn delete(&self, id: &str) -> Result<FileRecord, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Err(not_found());
        };

        let Some(record) = self.registry.find_by_id(id).await else {
            return Err(not_found());
        };

        let payload_removed = self.storage.delete(&record.stored_name).await.map_err(|e| {
            tracing::error!(
                error = %e,
                file_id = %record.id,
                stored_name = %record.stored_name,
                "Failed to delete payload, keeping record"
            );
            AppError::from(e)
        })?;

        // A concurrent sweep or delete may have dropped the record already.
        let record_removed = self.registry.remove(record.id).await;

        tracing::info!(
            file_id = %record.id,
            stored_name = %record.stored_name,
            payload_removed,
            record_removed,
            "File deleted"
        );

        Ok(record)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("File not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;
    use lanshare_storage::LocalStorage;
    use tempfile::tempdir;

    fn record(stored_name: &str) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            original_name: "a.txt".to_string(),
            stored_name: stored_name.to_string(),
            size_bytes: 3,
            uploaded_at: Utc::now(),
            download_url: format!("http://10.0.0.5:3000/download/{}", stored_name),
            encoded_link: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[tokio::test]
    async fn test_delete_twice_succeeds_then_not_found() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let registry = FileRegistry::new();
        storage
            .put("1_a.txt", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        let rec = record("1_a.txt");
        let id = rec.id.to_string();
        registry.append(rec).await.unwrap();

        let service = DeletionService::new(registry.clone(), storage.clone());

        let deleted = service.delete(&id).await.unwrap();
        assert_eq!(deleted.stored_name, "1_a.txt");
        assert!(!storage.exists("1_a.txt").await.unwrap());
        assert!(registry.is_empty().await);

        assert!(matches!(
            service.delete(&id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_payload_still_removes_record() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let registry = FileRegistry::new();
        let rec = record("1_never_written.txt");
        let id = rec.id.to_string();
        registry.append(rec).await.unwrap();

        let service = DeletionService::new(registry.clone(), storage);
        service.delete(&id).await.unwrap();
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_id_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let service = DeletionService::new(FileRegistry::new(), storage);

        assert!(matches!(
            service.delete(&Uuid::new_v4().to_string()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("not-a-uuid").await,
            Err(AppError::NotFound(_))
        ));
    }
}
