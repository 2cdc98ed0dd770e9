//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for lanshare_core::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                lanshare_core::AppError::NotFound(format!("File not found: {}", key))
            }
            other => lanshare_core::AppError::Io(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked payload read back from storage.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Payload source for a streaming write. May borrow from the request it is read from.
pub type ByteReader<'a> = Pin<Box<dyn AsyncRead + Send + 'a>>;

/// Storage abstraction trait
///
/// Payloads are addressed by a flat key. Writes never overwrite an existing payload and
/// deletes are idempotent, so concurrent deletion and expiration of the same key are safe.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a payload from a reader until EOF and return the number of bytes written.
    ///
    /// Fails with `AlreadyExists` before consuming the reader if the key is taken. A partially
    /// written payload is removed when the write fails.
    async fn put_stream<'a>(&self, key: &str, reader: ByteReader<'a>) -> StorageResult<u64>;

    /// Write an in-memory payload.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<u64> {
        self.put_stream(key, Box::pin(std::io::Cursor::new(data)))
            .await
    }

    /// Open a payload as a stream of chunks.
    async fn open_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Remove a payload. Returns `false` when it was already absent.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a payload exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of a payload, if it exists.
    async fn content_length(&self, key: &str) -> StorageResult<u64>;

    /// Human-readable location, used in startup logs.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanshare_core::{AppError, ErrorMetadata};

    #[test]
    fn test_not_found_maps_to_404() {
        let err: AppError = StorageError::NotFound("1_a.txt".to_string()).into();
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_other_failures_map_to_io() {
        for err in [
            StorageError::WriteFailed("disk full".to_string()),
            StorageError::DeleteFailed("busy".to_string()),
            StorageError::InvalidKey("../x".to_string()),
        ] {
            let app: AppError = err.into();
            assert!(matches!(app, AppError::Io(_)));
        }
    }
}
