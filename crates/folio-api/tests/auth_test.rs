//! Authentication integration tests.
//!
//! Run with: `cargo test -p folio-api --test auth_test`

mod helpers;

use helpers::auth::{
    bearer, expired_token_for, sign, TEST_CLIENT_API_KEY, TEST_MASTER_API_KEY,
};
use helpers::fixtures::{png_bytes, to_base64};
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};

fn upload_body() -> Value {
    json!({ "folder": "f", "name": "x.png", "image": to_base64(&png_bytes(2, 2)) })
}

#[tokio::test]
async fn test_read_routes_require_api_key() {
    let app = setup_test_app().await;
    let client = app.client();

    for path in [api_path("/status"), api_path("/u1/f"), api_path("/u1/f/x.png")] {
        let response = client.get(&path).await;
        assert_eq!(response.status_code(), 401, "{path}");
        assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");

        let response = client
            .get(&path)
            .add_header("x-api-key", "wrong-key-wrong-key-wrong-key-wrong-key")
            .await;
        assert_eq!(response.status_code(), 401, "{path}");
    }
}

#[tokio::test]
async fn test_any_configured_api_key_is_accepted() {
    let app = setup_test_app().await;

    for key in [TEST_MASTER_API_KEY, TEST_CLIENT_API_KEY] {
        let response = app
            .client()
            .get(&api_path("/status"))
            .add_header("x-api-key", key)
            .await;
        assert_eq!(response.status_code(), 200);
    }
}

#[tokio::test]
async fn test_upload_requires_api_key_before_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .put(&api_path("/upload/base64"))
        .add_header("Authorization", bearer("u1"))
        .json(&upload_body())
        .await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<Value>()["error"], "Missing API key");
}

#[tokio::test]
async fn test_upload_requires_bearer_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .put(&api_path("/upload/base64"))
        .add_header("x-api-key", TEST_MASTER_API_KEY)
        .json(&upload_body())
        .await;
    assert_eq!(response.status_code(), 401);

    let response = client
        .put(&api_path("/upload/base64"))
        .add_header("x-api-key", TEST_MASTER_API_KEY)
        .add_header("Authorization", "Basic dTE6cGFzcw==")
        .json(&upload_body())
        .await;
    assert_eq!(response.status_code(), 401);

    assert!(!app.storage_root().join("u1").exists());
}

#[tokio::test]
async fn test_expired_or_forged_tokens_rejected() {
    let app = setup_test_app().await;
    let forged = sign("u1", 3600, "some-other-secret-that-is-32-characters");

    for token in [expired_token_for("u1"), forged, "not.a.jwt".to_string()] {
        let response = app
            .client()
            .put(&api_path("/upload/base64"))
            .add_header("x-api-key", TEST_MASTER_API_KEY)
            .add_header("Authorization", format!("Bearer {}", token))
            .json(&upload_body())
            .await;
        assert_eq!(response.status_code(), 401, "{token}");
    }

    assert!(!app.storage_root().join("u1").exists());
}

#[tokio::test]
async fn test_token_subject_is_the_owner() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .put(&api_path("/upload/base64"))
        .add_header("x-api-key", TEST_MASTER_API_KEY)
        .add_header("Authorization", bearer("carol"))
        .json(&upload_body())
        .await;
    assert_eq!(response.status_code(), 201);
    let url = response.json::<Value>()["url"].as_str().unwrap().to_string();
    assert!(url.ends_with("/api/v0/images/carol/f/x.png"), "{url}");
    assert!(app.storage_root().join("carol").join("f").join("x.png").exists());
}

#[tokio::test]
async fn test_token_subject_must_be_a_valid_owner() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .put(&api_path("/upload/base64"))
        .add_header("x-api-key", TEST_MASTER_API_KEY)
        .add_header("Authorization", bearer(".."))
        .json(&upload_body())
        .await;
    assert_eq!(response.status_code(), 401);
}
