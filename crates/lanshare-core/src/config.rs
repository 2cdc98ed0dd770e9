//! Configuration module
//!
//! Settings are read from the process environment (optionally seeded from a `.env` file).
//! Every value has a default so the service starts with zero configuration on a LAN.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    CLEANUP_INTERVAL_SECS, DEFAULT_BIND_ADDRESS, DEFAULT_PORT, DEFAULT_STORAGE_DIR,
    MAX_FILE_SIZE_BYTES, MAX_FILE_SIZE_MB, RETENTION_HOURS,
};

const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: IpAddr,
    pub storage_dir: PathBuf,
    pub max_file_size_bytes: u64,
    pub retention_hours: i64,
    /// Zero disables the background sweeper.
    pub cleanup_interval_secs: u64,
    /// Host placed in download links instead of the discovered LAN address.
    pub public_host: Option<String>,
    pub cors_origins: Vec<String>,
    /// Upper bound on requests handled at once.
    pub http_concurrency_limit: usize,
    pub environment: String,
    /// `LOG_FORMAT=json` switches console logs to JSON lines.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: IpAddr::from([0, 0, 0, 0]),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            retention_hours: RETENTION_HOURS,
            cleanup_interval_secs: CLEANUP_INTERVAL_SECS,
            public_host: None,
            cors_origins: vec!["*".to_string()],
            http_concurrency_limit: DEFAULT_HTTP_CONCURRENCY_LIMIT,
            environment: "development".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable numeric values fall back
    /// to their defaults; a malformed port or bind address is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb = lookup("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let config = Config {
            port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            bind_address: lookup("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("BIND_ADDRESS must be a valid IP address"))?,
            storage_dir: lookup("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR)),
            max_file_size_bytes: max_file_size_mb.saturating_mul(1024 * 1024),
            retention_hours: lookup("RETENTION_HOURS")
                .unwrap_or_else(|| RETENTION_HOURS.to_string())
                .parse()
                .unwrap_or(RETENTION_HOURS),
            cleanup_interval_secs: lookup("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|| CLEANUP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(CLEANUP_INTERVAL_SECS),
            public_host: lookup("PUBLIC_HOST")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            cors_origins,
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
                .max(1),
            environment,
            log_json: lookup("LOG_FORMAT")
                .map(|f| f.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.port == 0 {
            return Err(anyhow::anyhow!("PORT must be greater than 0"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.retention_hours <= 0 {
            return Err(anyhow::anyhow!("RETENTION_HOURS must be greater than 0"));
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_DIR must not be empty"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::hours(self.retention_hours)
    }

    /// `None` when the sweeper is disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_file_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.retention_hours, 24);
        assert_eq!(config.cleanup_interval(), Some(Duration::from_secs(3600)));
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(config.public_host.is_none());
        assert_eq!(config.http_concurrency_limit, 1024);
        assert!(!config.is_production());
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("MAX_FILE_SIZE_MB", "5"),
            ("CLEANUP_INTERVAL_SECS", "0"),
            ("PUBLIC_HOST", " files.lan "),
            ("CORS_ORIGINS", "http://a.lan, http://b.lan"),
            ("APP_ENV", "prod"),
            ("LOG_FORMAT", "JSON"),
            ("HTTP_CONCURRENCY_LIMIT", "0"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_file_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.cleanup_interval(), None);
        assert_eq!(config.public_host.as_deref(), Some("files.lan"));
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.is_production());
        assert!(config.log_json);
        assert_eq!(config.http_concurrency_limit, 1);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unparseable_size_falls_back_to_default() {
        let config = Config::from_lookup(lookup_from(&[("MAX_FILE_SIZE_MB", "lots")])).unwrap();
        assert_eq!(config.max_file_size_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = Config {
            max_file_size_bytes: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            retention_hours: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
