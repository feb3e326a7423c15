//! OpenAPI documentation.
//! Paths in handler annotations use the literal prefix /api/v0; they are rewritten
//! at runtime when `folio_core::constants::API_VERSION` moves on.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use folio_core::constants::API_VERSION;
use folio_core::models;

/// Version used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PATH_PLACEHOLDER: &str = "/api/v0";

fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, version: &str) {
    let replacement = format!("/api/{}", version);
    if OPENAPI_PATH_PLACEHOLDER == replacement {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(OPENAPI_PATH_PLACEHOLDER, &replacement, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with paths matching the current API version.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, API_VERSION);
    spec
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
        );
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API",
        version = "0.1.0",
        description = "Authenticated image storage (v0). Images are uploaded as multipart files or base64 JSON into per-owner folders and served back by path. All image endpoints live under /api/v0/images/."
    ),
    paths(
        handlers::image_upload::upload_image,
        handlers::image_upload::upload_image_base64,
        handlers::image_view::view_image,
        handlers::image_view::list_folder,
        handlers::status::status,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::FolderListing,
            models::ListingEntry,
            models::StatusResponse,
            handlers::image_upload::Base64UploadRequest,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "images", description = "Image upload, retrieval and folder listing"),
        (name = "service", description = "Service status and health checks")
    )
)]
pub struct ApiDoc;
