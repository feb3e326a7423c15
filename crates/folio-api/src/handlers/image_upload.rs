use std::sync::Arc;

use axum::{
    extract::multipart::MultipartRejection,
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use folio_core::{AppError, UploadResponse};
use folio_processing::{UploadForm, UploadPayload};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::models::OwnerContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// JSON body of a base64 upload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct Base64UploadRequest {
    /// Target folder. Falls back to the configured default when absent or empty.
    #[serde(default)]
    pub folder: Option<String>,
    /// Image name. Generated when absent or empty.
    #[serde(default)]
    pub name: Option<String>,
    /// Standard padded base64, optionally as a `data:` URI.
    #[serde(default)]
    pub image: String,
}

/// Upload image handler (multipart)
///
/// Accepts a multipart form with an `image` file part and optional `folder` and
/// `name` text fields, and stores the image under the token's owner.
///
/// # Errors
/// - `AppError::InvalidFolder` - Folder is not a valid segment
/// - `AppError::EmptyImage` - Image part carries no bytes
/// - `AppError::UnsupportedMediaType` - Content is not an allowed image format
/// - `AppError::PayloadTooLarge` - Image exceeds the size limit
/// - `AppError::StoreUnavailable` - The write failed
#[utoipa::path(
    put,
    path = "/api/v0/images/upload",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 415, description = "Not an allowed image format", body = ErrorResponse),
        (status = 503, description = "Image store unavailable", body = ErrorResponse)
    ),
    security(("api_key" = [], "bearer" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(owner = %owner_ctx.owner, operation = "upload_image")
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    owner_ctx: OwnerContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let form = read_upload_form(multipart?).await?;
    let upload = state.upload.handle(&owner_ctx.owner, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse::new(upload.completed_at, upload.url)),
    ))
}

/// Upload image handler (base64 JSON)
#[utoipa::path(
    put,
    path = "/api/v0/images/upload/base64",
    tag = "images",
    request_body(content = Base64UploadRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Invalid input or encoding", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 415, description = "Not an allowed image format", body = ErrorResponse),
        (status = 503, description = "Image store unavailable", body = ErrorResponse)
    ),
    security(("api_key" = [], "bearer" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(owner = %owner_ctx.owner, operation = "upload_image_base64")
)]
pub async fn upload_image_base64(
    State(state): State<Arc<AppState>>,
    owner_ctx: OwnerContext,
    ValidatedJson(request): ValidatedJson<Base64UploadRequest>,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let form = UploadForm {
        folder: request.folder,
        name: request.name,
        payload: UploadPayload::Base64(request.image),
    };
    let upload = state.upload.handle(&owner_ctx.owner, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse::new(upload.completed_at, upload.url)),
    ))
}

/// Collect the known fields of an upload form. Unknown fields are drained and ignored.
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, HttpAppError> {
    let mut folder = None;
    let mut name = None;
    let mut image: Option<(Bytes, Option<String>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("folder") => folder = Some(field.text().await?),
            Some("name") => name = Some(field.text().await?),
            Some("image") => {
                if image.is_some() {
                    return Err(AppError::InvalidInput(
                        "Only one image may be uploaded per request".to_string(),
                    )
                    .into());
                }
                let declared_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                image = Some((bytes, declared_type));
            }
            _ => {
                field.bytes().await?;
            }
        }
    }

    let (bytes, declared_type) = image.ok_or_else(|| {
        HttpAppError(AppError::InvalidInput(
            "Missing 'image' file part".to_string(),
        ))
    })?;

    Ok(UploadForm {
        folder,
        name,
        payload: UploadPayload::Multipart {
            bytes,
            declared_type,
        },
    })
}
