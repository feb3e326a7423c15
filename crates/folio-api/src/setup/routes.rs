//! Route configuration and setup.

use crate::api_doc;
use crate::auth::middleware::{api_key_middleware, jwt_middleware, AuthState, API_KEY_HEADER};
use crate::error::HttpAppError;
use crate::handlers::{health, image_upload, image_view, status};
use crate::middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use folio_core::constants::API_PREFIX;
use folio_core::{AppError, Config};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Multipart framing and the base64 expansion (4/3) on top of the image limit.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState::from_config(config));

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let http_concurrency_limit = config.http_concurrency_limit();
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let max_body_bytes = config
        .max_file_size_bytes()
        .saturating_mul(4)
        .div_ceil(3)
        .saturating_add(BODY_OVERHEAD_BYTES);

    let app = public_routes()
        .nest(API_PREFIX, image_routes(auth_state))
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .fallback(not_found)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(api_doc::get_openapi_spec()) }),
        )
}

/// Everything under the image prefix needs an API key; uploads also need a
/// bearer token naming the owner.
fn image_routes(auth_state: Arc<AuthState>) -> Router<Arc<AppState>> {
    let upload_routes = Router::new()
        .route("/upload", put(image_upload::upload_image))
        .route("/upload/base64", put(image_upload::upload_image_base64))
        .route_layer(from_fn_with_state(auth_state.clone(), jwt_middleware));

    let read_routes = Router::new()
        .route("/status", get(status::status))
        .route("/{owner}/{folder}", get(image_view::list_folder))
        .route("/{owner}/{folder}/", get(image_view::list_folder))
        .route("/{owner}/{folder}/{name}", get(image_view::view_image));

    upload_routes
        .merge(read_routes)
        .route_layer(from_fn_with_state(auth_state, api_key_middleware))
}

async fn not_found() -> impl IntoResponse {
    HttpAppError(AppError::NotFound("Nothing to see here".to_string()))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let allowed_headers = [
        header::ACCEPT,
        header::ACCEPT_ENCODING,
        header::AUTHORIZATION,
        header::CONTENT_LENGTH,
        header::CONTENT_TYPE,
        HeaderName::from_static("x-requested-with"),
        HeaderName::from_static("x-csrf-token"),
        HeaderName::from_static(API_KEY_HEADER),
        HeaderName::from_static(REQUEST_ID_HEADER),
    ];
    let methods = [Method::GET, Method::HEAD, Method::PUT, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new().allow_origin(origins)
    };

    Ok(cors
        .allow_methods(methods)
        .allow_headers(allowed_headers)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]))
}
