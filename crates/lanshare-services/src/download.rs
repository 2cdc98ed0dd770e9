//! Download resolution by stored name

use std::sync::Arc;

use lanshare_core::AppError;
use lanshare_storage::{ByteStream, Storage, StorageError};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::content_type::content_type_for;
use crate::registry::FileRegistry;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub struct ResolvedDownload {
    pub original_name: String,
    pub content_type: &'static str,
    pub content_length: Option<u64>,
    pub content_disposition: String,
    pub stream: ByteStream,
}

impl std::fmt::Debug for ResolvedDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedDownload")
            .field("original_name", &self.original_name)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("content_disposition", &self.content_disposition)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct DownloadResolver {
    registry: FileRegistry,
    storage: Arc<dyn Storage>,
}

impl DownloadResolver {
    pub fn new(registry: FileRegistry, storage: Arc<dyn Storage>) -> Self {
        Self { registry, storage }
    }

    /// Both the payload and the record must exist; either gap is reported as not found.
    #[tracing::instrument(skip(self), fields(download.operation = "resolve"))]
    pub async fn resolve(&self, stored_name: &str) -> Result<ResolvedDownload, AppError> {
        let present = match self.storage.exists(stored_name).await {
            Ok(present) => present,
            Err(StorageError::InvalidKey(_)) => false,
            Err(e) => return Err(e.into()),
        };
        if !present {
            tracing::debug!(stored_name = %stored_name, "Payload missing from storage");
            return Err(not_found());
        }

        let Some(record) = self.registry.find_by_stored_name(stored_name).await else {
            tracing::warn!(
                stored_name = %stored_name,
                "Payload exists without a registry record"
            );
            return Err(not_found());
        };

        // The payload can vanish between the check and the open.
        let stream = self
            .storage
            .open_stream(stored_name)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => not_found(),
                other => other.into(),
            })?;

        let content_length = self.storage.content_length(stored_name).await.ok();

        tracing::info!(
            file_id = %record.id,
            stored_name = %stored_name,
            size_bytes = record.size_bytes,
            "Serving download"
        );

        Ok(ResolvedDownload {
            content_type: content_type_for(&record.original_name),
            content_length,
            content_disposition: content_disposition(&record.original_name),
            original_name: record.original_name,
            stream,
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("File not found".to_string())
}

/// `attachment` disposition carrying the percent-encoded original name.
pub fn content_disposition(original_name: &str) -> String {
    let encoded = utf8_percent_encode(original_name, URI_COMPONENT).to_string();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        encoded, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;
    use futures::StreamExt;
    use lanshare_core::FileRecord;
    use lanshare_storage::LocalStorage;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn record(stored_name: &str, original_name: &str, size_bytes: u64) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            original_name: original_name.to_string(),
            stored_name: stored_name.to_string(),
            size_bytes,
            uploaded_at: Utc::now(),
            download_url: format!("http://10.0.0.5:3000/download/{}", stored_name),
            encoded_link: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[test]
    fn test_content_disposition_matches_uri_component_encoding() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
        assert_eq!(
            content_disposition("my report (1).pdf"),
            "attachment; filename=\"my%20report%20(1).pdf\"; filename*=UTF-8''my%20report%20(1).pdf"
        );
        assert!(content_disposition("文件.txt").contains("%E6%96%87%E4%BB%B6.txt"));
        assert!(!content_disposition("a\"b.txt").contains("a\"b"));
    }

    #[tokio::test]
    async fn test_resolve_streams_payload() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let registry = FileRegistry::new();
        storage
            .put("1_report.pdf", Bytes::from(vec![9u8; 5000]))
            .await
            .unwrap();
        registry
            .append(record("1_report.pdf", "report.pdf", 5000))
            .await
            .unwrap();

        let resolver = DownloadResolver::new(registry, storage);
        let mut resolved = resolver.resolve("1_report.pdf").await.unwrap();

        assert_eq!(resolved.content_type, "application/pdf");
        assert_eq!(resolved.content_length, Some(5000));
        assert!(resolved.content_disposition.contains("report.pdf"));

        let mut body = Vec::new();
        while let Some(chunk) = resolved.stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body.len(), 5000);
    }

    #[tokio::test]
    async fn test_record_without_payload_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let registry = FileRegistry::new();
        registry
            .append(record("1_gone.txt", "gone.txt", 3))
            .await
            .unwrap();

        let resolver = DownloadResolver::new(registry, storage);
        assert!(matches!(
            resolver.resolve("1_gone.txt").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_payload_without_record_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        storage
            .put("1_orphan.txt", Bytes::from_static(b"abc"))
            .await
            .unwrap();

        let resolver = DownloadResolver::new(FileRegistry::new(), storage);
        assert!(matches!(
            resolver.resolve("1_orphan.txt").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_stored_name_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());

        let resolver = DownloadResolver::new(FileRegistry::new(), storage);
        assert!(matches!(
            resolver.resolve("../Cargo.toml").await,
            Err(AppError::NotFound(_))
        ));
    }
}
