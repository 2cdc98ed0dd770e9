//! LAN Share Core Library
//!
//! This crate provides the file record model, API response shapes, error types and
//! configuration shared by the storage, services and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    format_file_size, DeleteResponse, FileRecord, FileResponse, HealthResponse,
    ListFilesResponse, UploadResponse,
};
