//! Test helpers: build the router over a throwaway store for integration tests.
//!
//! Run from workspace root: `cargo test -p folio-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use folio_api::setup::build_app;
use folio_api::state::AppState;
use folio_core::constants::API_PREFIX;
use folio_core::{BaseConfig, Config, ImageServiceConfig, LogFormat, StorageBackend};
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_PUBLIC_BASE_URL: &str = "http://images.test";

/// Image API path for tests (e.g. `/api/v0/images/status`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> &std::path::Path {
        self._temp_dir.path()
    }
}

pub fn create_test_config(storage_path: &str) -> Config {
    Config(Box::new(ImageServiceConfig {
        base: BaseConfig {
            server_port: 3000,
            cors_origins: vec!["*".to_string()],
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            master_api_key: auth::TEST_MASTER_API_KEY.to_string(),
            api_keys: vec![auth::TEST_CLIENT_API_KEY.to_string()],
            http_concurrency_limit: 100,
            environment: "test".to_string(),
            log_format: LogFormat::Compact,
        },
        public_base_url: TEST_PUBLIC_BASE_URL.to_string(),
        storage_backend: StorageBackend::Local,
        local_storage_path: Some(storage_path.to_string()),
        default_folder: "general".to_string(),
        max_file_size_bytes: 1024 * 1024,
        allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
        ],
    }))
}

/// Setup test app with local storage in a temp directory.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Same as [`setup_test_app`], with a hook to adjust the config first.
pub async fn setup_test_app_with(adjust: impl FnOnce(&mut ImageServiceConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = create_test_config(temp_dir.path().to_str().expect("utf-8 temp path"));
    adjust(&mut config.0);
    config.validate().expect("Test config must be valid");

    let (state, router) = build_app(config).await.expect("Failed to build app");
    let server = TestServer::new(router.into_make_service()).expect("Failed to start test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
