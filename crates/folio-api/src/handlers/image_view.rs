use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use folio_core::{AppError, FolderListing};
use folio_storage::StoredObject;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::Retrieved;
use crate::state::AppState;

/// Serve one stored image
#[utoipa::path(
    get,
    path = "/api/v0/images/{owner}/{folder}/{name}",
    tag = "images",
    params(
        ("owner" = String, Path, description = "Owner of the image"),
        ("folder" = String, Path, description = "Folder containing the image"),
        ("name" = String, Path, description = "Image name")
    ),
    responses(
        (status = 200, description = "Image bytes with their stored content type"),
        (status = 400, description = "Invalid path segment", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 503, description = "Image store unavailable", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn view_image(
    State(state): State<Arc<AppState>>,
    Path((owner, folder, name)): Path<(String, String, String)>,
) -> Result<Response, HttpAppError> {
    match state.retrieval.handle(&owner, &folder, Some(&name)).await? {
        Retrieved::Image(object) => Ok(image_response(object)),
        Retrieved::Listing(listing) => Ok(Json(listing).into_response()),
    }
}

/// List the images in a folder
#[utoipa::path(
    get,
    path = "/api/v0/images/{owner}/{folder}",
    tag = "images",
    params(
        ("owner" = String, Path, description = "Owner of the folder"),
        ("folder" = String, Path, description = "Folder to list")
    ),
    responses(
        (status = 200, description = "Images in the folder, ordered by name", body = FolderListing),
        (status = 400, description = "Invalid path segment", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 404, description = "Folder holds no images", body = ErrorResponse),
        (status = 503, description = "Image store unavailable", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn list_folder(
    State(state): State<Arc<AppState>>,
    Path((owner, folder)): Path<(String, String)>,
) -> Result<Json<FolderListing>, HttpAppError> {
    match state.retrieval.handle(&owner, &folder, None).await? {
        Retrieved::Listing(listing) => Ok(Json(listing)),
        Retrieved::Image(_) => Err(HttpAppError(AppError::Internal(
            "listing request returned an image".to_string(),
        ))),
    }
}

fn image_response(object: StoredObject) -> Response {
    let content_type = HeaderValue::from_str(&object.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let last_modified = object
        .last_modified
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    let mut response = (StatusCode::OK, Body::from(object.bytes)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    if let Ok(value) = HeaderValue::from_str(&last_modified) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    response
}
