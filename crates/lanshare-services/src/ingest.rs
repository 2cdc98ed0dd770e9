//! Upload ingestion: validate, persist, link, register.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lanshare_core::{format_file_size, AppError, FileRecord};
use lanshare_storage::{ByteReader, Storage, StorageError};
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use crate::filename::{display_name, sanitize_for_storage, FilenameDecoder};
use crate::link::LinkGenerator;
use crate::registry::FileRegistry;

/// Upper bound on millisecond bumps when a stored name is already taken.
const MAX_NAME_ATTEMPTS: i64 = 16;

/// One file part of an upload request.
pub struct IncomingFile<'a> {
    /// Filename as sent by the client, before decoding.
    pub file_name: Option<String>,
    /// Size announced by the client, if any. Used only to reject early.
    pub declared_size: Option<u64>,
    pub reader: ByteReader<'a>,
}

#[derive(Clone)]
pub struct IngestionService {
    registry: FileRegistry,
    storage: Arc<dyn Storage>,
    links: LinkGenerator,
    decoder: Arc<dyn FilenameDecoder>,
    max_file_size: u64,
}

impl IngestionService {
    pub fn new(
        registry: FileRegistry,
        storage: Arc<dyn Storage>,
        links: LinkGenerator,
        decoder: Arc<dyn FilenameDecoder>,
        max_file_size: u64,
    ) -> Self {
        Self {
            registry,
            storage,
            links,
            decoder,
            max_file_size,
        }
    }

    /// Persist an uploaded file and register it.
    ///
    /// On any failure after the payload is written, the payload is removed again so that no
    /// orphan is left without a record.
    #[tracing::instrument(skip(self, incoming), fields(ingest.operation = "upload"))]
    pub async fn ingest(&self, incoming: Option<IncomingFile<'_>>) -> Result<FileRecord, AppError> {
        let start = std::time::Instant::now();

        let Some(incoming) = incoming else {
            return Err(AppError::Validation("No file uploaded".to_string()));
        };

        let raw_name = incoming
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

        if let Some(declared) = incoming.declared_size {
            if declared > self.max_file_size {
                return Err(self.too_large());
            }
        }

        let original_name = display_name(&self.decoder.decode(raw_name));
        let (stored_name, uploaded_at) = self.allocate_stored_name(&original_name).await?;

        let limited: ByteReader<'_> = Box::pin(incoming.reader.take(self.max_file_size + 1));
        let size_bytes = match self.storage.put_stream(&stored_name, limited).await {
            Ok(written) => written,
            Err(StorageError::AlreadyExists(_)) => {
                return Err(AppError::Io(format!(
                    "Stored name {} was taken concurrently",
                    stored_name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if size_bytes == 0 {
            self.discard(&stored_name).await;
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        if size_bytes > self.max_file_size {
            self.discard(&stored_name).await;
            return Err(self.too_large());
        }

        let link = match self.links.generate(&stored_name) {
            Ok(link) => link,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    stored_name = %stored_name,
                    "Link encoding failed, rolling back upload"
                );
                self.discard(&stored_name).await;
                return Err(e);
            }
        };

        let record = FileRecord {
            id: Uuid::new_v4(),
            original_name,
            stored_name,
            size_bytes,
            uploaded_at,
            download_url: link.download_url,
            encoded_link: link.encoded_link,
        };

        if let Err(e) = self.registry.append(record.clone()).await {
            self.discard(&record.stored_name).await;
            return Err(e);
        }

        tracing::info!(
            file_id = %record.id,
            stored_name = %record.stored_name,
            original_name = %record.original_name,
            size_bytes = record.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File uploaded"
        );

        Ok(record)
    }

    /// `<millis>_<name>`, bumping the millisecond part while the name is taken.
    async fn allocate_stored_name(
        &self,
        original_name: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let uploaded_at = Utc::now();
        let name = sanitize_for_storage(original_name);
        let base_millis = uploaded_at.timestamp_millis();

        for bump in 0..MAX_NAME_ATTEMPTS {
            let candidate = format!("{}_{}", base_millis + bump, name);
            if self.registry.contains_stored_name(&candidate).await {
                continue;
            }
            if self.storage.exists(&candidate).await? {
                continue;
            }
            return Ok((candidate, uploaded_at));
        }

        Err(AppError::Io(format!(
            "No free stored name for {} after {} attempts",
            name, MAX_NAME_ATTEMPTS
        )))
    }

    async fn discard(&self, stored_name: &str) {
        if let Err(e) = self.storage.delete(stored_name).await {
            tracing::error!(
                error = %e,
                stored_name = %stored_name,
                "Failed to remove payload after a rejected upload"
            );
        }
    }

    /// Rejection for a payload over the configured ceiling.
    pub fn too_large(&self) -> AppError {
        AppError::Validation(format!(
            "File too large. Maximum size is {}",
            format_file_size(self.max_file_size)
        ))
    }
}
