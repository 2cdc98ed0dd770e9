//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p lanshare-api`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use lanshare_api::setup::{routes, services};
use lanshare_api::AppState;
use lanshare_core::Config;
use lanshare_services::StaticAddressProvider;
use lanshare_storage::LocalStorage;
use tempfile::TempDir;

pub const TEST_HOST: &str = "192.168.1.20";

/// Test application: server, state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_dir(&self) -> &Path {
        self._temp_dir.path()
    }

    pub fn payload_path(&self, stored_name: &str) -> PathBuf {
        self.storage_dir().join(stored_name)
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Config::default().max_file_size_bytes).await
}

/// Build the full router against a temporary directory with a fixed LAN host.
pub async fn setup_test_app_with(max_file_size_bytes: u64) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let config = Config {
        storage_dir: temp_dir.path().to_path_buf(),
        max_file_size_bytes,
        ..Config::default()
    };

    let storage = LocalStorage::new(temp_dir.path())
        .await
        .expect("Failed to create local storage");
    let state = services::build_state(
        &config,
        Arc::new(storage),
        Arc::new(StaticAddressProvider::new(TEST_HOST)),
    );

    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

pub fn file_form(file_name: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type("application/octet-stream");
    MultipartForm::new().add_part("file", part)
}

/// Path component of a download URL, e.g. `/download/1700000000000_report.pdf`.
pub fn download_path(download_url: &str) -> String {
    let start = download_url
        .find("/download/")
        .expect("download URL has a /download/ segment");
    download_url[start..].to_string()
}
