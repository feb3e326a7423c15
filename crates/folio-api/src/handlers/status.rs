use std::sync::Arc;

use axum::{extract::State, Json};
use folio_core::constants::{SERVICE_CANONICAL_NAME, SERVICE_DESCRIPTION, SERVICE_NAME};
use folio_core::StatusResponse;

use crate::error::ErrorResponse;
use crate::state::AppState;

/// Service identity and version
#[utoipa::path(
    get,
    path = "/api/v0/images/status",
    tag = "service",
    responses(
        (status = 200, description = "Service status", body = StatusResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: SERVICE_DESCRIPTION.to_string(),
        canonical_name: SERVICE_CANONICAL_NAME.to_string(),
        storage_backend: state.storage.backend_type().to_string(),
    })
}
