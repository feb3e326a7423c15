use folio_api::auth::models::JwtClaims;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

/// Test master API key (must match create_test_config).
pub const TEST_MASTER_API_KEY: &str = "test-master-api-key-at-least-32-characters-long";

/// Additional key from the API_KEYS list.
pub const TEST_CLIENT_API_KEY: &str = "test-client-api-key-at-least-32-characters-long";

pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

/// Signed HS256 token for `owner`, valid for an hour.
pub fn token_for(owner: &str) -> String {
    sign(owner, 3600, TEST_JWT_SECRET)
}

/// Token whose `exp` lies in the past.
pub fn expired_token_for(owner: &str) -> String {
    sign(owner, -3600, TEST_JWT_SECRET)
}

pub fn sign(owner: &str, expires_in_secs: i64, secret: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: owner.to_string(),
        exp: now + expires_in_secs,
        iat: Some(now),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

pub fn bearer(owner: &str) -> String {
    format!("Bearer {}", token_for(owner))
}
