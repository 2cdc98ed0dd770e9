//! LAN Share Storage Library
//!
//! Payload persistence behind the `Storage` trait, with a local filesystem backend.
//!
//! # Storage key format
//!
//! Keys are flat file names inside the storage directory (`<millis>_<name>`). A key must be
//! non-empty, must not start with `.`, and must not contain path separators, `..` or NUL.
//! Validation lives in the `keys` module so every backend rejects the same inputs.

pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{ByteReader, ByteStream, Storage, StorageError, StorageResult};
