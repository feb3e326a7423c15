//! Status, health, documentation and cross-cutting HTTP behaviour.
//!
//! Run with: `cargo test -p folio-api --test service_test`

mod helpers;

use folio_core::StorageBackend;
use helpers::auth::TEST_MASTER_API_KEY;
use helpers::{api_path, setup_test_app, setup_test_app_with};
use serde_json::Value;

#[tokio::test]
async fn test_status() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/status"))
        .add_header("x-api-key", TEST_MASTER_API_KEY)
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["name"], "folio");
    assert_eq!(body["canonical_name"], "folio-image-service");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["storage_backend"], "local");
}

#[tokio::test]
async fn test_status_reports_memory_backend() {
    let app = setup_test_app_with(|config| config.storage_backend = StorageBackend::Memory).await;

    let body: Value = app
        .client()
        .get(&api_path("/status"))
        .add_header("x-api-key", TEST_MASTER_API_KEY)
        .await
        .json();
    assert_eq!(body["storage_backend"], "memory");
}

#[tokio::test]
async fn test_health_needs_no_credentials() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "healthy");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);

    let spec: Value = response.json();
    let paths = spec["paths"].as_object().unwrap();
    for path in [
        "/api/v0/images/upload",
        "/api/v0/images/upload/base64",
        "/api/v0/images/{owner}/{folder}",
        "/api/v0/images/{owner}/{folder}/{name}",
        "/api/v0/images/status",
    ] {
        assert!(paths.contains_key(path), "{path}");
    }

    let docs = app.client().get("/docs").await;
    assert_eq!(docs.status_code(), 200);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health")
        .add_header("x-request-id", "trace-123")
        .await;
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-123"
    );

    let response = app.client().get("/health").await;
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = setup_test_app().await;

    let response = app.client().get("/nothing/here/at/all/really").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_cors_preflight_allows_put() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .method(axum::http::Method::OPTIONS, &api_path("/upload"))
        .add_header("origin", "http://example.com")
        .add_header("access-control-request-method", "PUT")
        .await;
    assert!(response.status_code().is_success());
    let allowed = response
        .headers()
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("PUT"), "{allowed}");
}
