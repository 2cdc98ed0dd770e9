//! Service-wide defaults.

/// Largest accepted upload, in MiB.
pub const MAX_FILE_SIZE_MB: u64 = 100;

pub const MAX_FILE_SIZE_BYTES: u64 = MAX_FILE_SIZE_MB * 1024 * 1024;

/// Hours an upload stays available before the sweeper removes it.
pub const RETENTION_HOURS: i64 = 24;

/// Seconds between expiration sweeps.
pub const CLEANUP_INTERVAL_SECS: u64 = 3600;

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_STORAGE_DIR: &str = "uploads";

/// Host used in download links when no LAN address can be found.
pub const FALLBACK_HOST: &str = "localhost";

/// Route prefix under which payloads are served.
pub const DOWNLOAD_PATH: &str = "/download";

/// Multipart field that carries the uploaded payload.
pub const UPLOAD_FIELD: &str = "file";
