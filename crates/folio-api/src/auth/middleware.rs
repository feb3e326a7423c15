use crate::auth::jwt::{bearer_token, JwtVerifier};
use crate::auth::models::OwnerContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use folio_core::{AppError, Config};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AuthState {
    api_keys: Vec<String>,
    jwt: JwtVerifier,
}

impl AuthState {
    pub fn new(master_api_key: String, api_keys: Vec<String>, jwt: JwtVerifier) -> Self {
        let mut keys = Vec::with_capacity(api_keys.len() + 1);
        keys.push(master_api_key);
        keys.extend(api_keys.into_iter().filter(|k| !k.is_empty()));
        Self {
            api_keys: keys,
            jwt,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.master_api_key().to_string(),
            config.api_keys().to_vec(),
            JwtVerifier::new(config.jwt_secret()),
        )
    }

    /// Every configured key is compared so timing does not reveal which one matched.
    pub fn is_valid_api_key(&self, candidate: &str) -> bool {
        self.api_keys
            .iter()
            .fold(false, |matched, key| secure_compare(candidate, key) | matched)
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

/// Gate for every image route: the request must carry a configured API key.
pub async fn api_key_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let api_key = match request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        Some(key) => key,
        None => return unauthorized("Missing API key"),
    };

    if !auth_state.is_valid_api_key(api_key) {
        tracing::debug!(path = %request.uri().path(), "Rejected request with invalid API key");
        return unauthorized("Invalid API key");
    }

    next.run(request).await
}

/// Gate for uploads: a valid bearer token names the owner being written to.
pub async fn jwt_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => header,
        None => return unauthorized("Missing authorization header"),
    };

    let token = match bearer_token(header) {
        Some(token) => token,
        None => return unauthorized("Invalid authorization header format"),
    };

    match auth_state.jwt.verify(token) {
        Ok(owner) => {
            request.extensions_mut().insert(OwnerContext { owner });
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("abc", "abc"));
        assert!(!secure_compare("abc", "abd"));
        assert!(!secure_compare("abc", "abcd"));
    }

    #[test]
    fn test_api_key_lookup() {
        let auth = AuthState::new(
            "master-key-0123456789-0123456789-xx".to_string(),
            vec![
                "client-key-0123456789-0123456789-xx".to_string(),
                String::new(),
            ],
            JwtVerifier::new(SECRET),
        );
        assert!(auth.is_valid_api_key("master-key-0123456789-0123456789-xx"));
        assert!(auth.is_valid_api_key("client-key-0123456789-0123456789-xx"));
        assert!(!auth.is_valid_api_key(""));
        assert!(!auth.is_valid_api_key("client-key"));
    }
}
