use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::converter;
use crate::error::ApiError;
use crate::gemini::{ContentGenerator, GeminiClient};
use crate::json_format;
use crate::mock_store::MockStore;
use crate::models::api::{
    ConvertRequest, ConvertResponse, CreateMockResponse, FormatJsonResponse, RegexRequest,
    SqlRequest, SqlResponse,
};
use crate::prompts::split_regex_response;
use crate::util::{build_http_client, cors_layer_from_env};

/// Routes served by this process, reported by `/api/status`.
pub const ROUTES: [&str; 8] = [
    "POST /api/mock/create",
    "GET /mock/{id}",
    "POST /api/regex/generate",
    "POST /api/config/convert",
    "POST /api/sql/generate",
    "POST /api/json/format",
    "GET /api/status",
    "GET /*",
];

/// Shared state handed to every handler.
pub struct AppState {
    pub mocks: MockStore,
    pub generator: Arc<dyn ContentGenerator>,
    pub web_dir: PathBuf,
}

impl AppState {
    pub fn new(generator: Arc<dyn ContentGenerator>, web_dir: impl Into<PathBuf>) -> Self {
        Self {
            mocks: MockStore::new(),
            generator,
            web_dir: web_dir.into(),
        }
    }

    /// State backed by the real Gemini client described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let http = build_http_client(config.http_timeout);
        let gemini = GeminiClient::new(http, config.gemini_api_key.clone())
            .with_base_url(config.gemini_base_url.clone())
            .with_model(config.gemini_model.clone());
        Self::new(Arc::new(gemini), config.web_dir.clone())
    }
}

/// Build the Axum router: JSON API, mock retrieval, and static files for everything else.
pub fn build_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.web_dir);

    Router::new()
        .route("/api/status", get(status))
        .route("/api/mock/create", post(create_mock))
        .route("/api/regex/generate", post(generate_regex))
        .route("/api/config/convert", post(convert_config))
        .route("/api/sql/generate", post(generate_sql))
        .route("/api/json/format", post(format_json))
        .route("/mock/:id", get(get_mock))
        .fallback_service(assets)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer_from_env())
}

/// Decode a JSON body, mapping any failure to a 400 with `msg`.
fn decode_body<T: DeserializeOwned>(body: &[u8], msg: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting request body");
        ApiError::bad_request(msg)
    })
}

/// Scheme and host the client used to reach us, for building absolute URLs.
fn request_origin(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "devkit",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": ROUTES,
        "mocks": state.mocks.len(),
    }))
}

/// Store an arbitrary JSON object and return where it can be fetched.
async fn create_mock(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let object: serde_json::Map<String, serde_json::Value> =
        decode_body(&body, "Invalid JSON body")?;
    let serialized = serde_json::to_string(&object)
        .map_err(|_| ApiError::Internal("Failed to create mock".into()))?;

    let id = state.mocks.create_mock(serialized).map_err(|e| {
        tracing::error!(error = %e, "mock creation failed");
        ApiError::Internal("Failed to create mock".into())
    })?;
    tracing::info!(id = %id, "mock created");

    let url = format!("{}/mock/{id}", request_origin(&headers));
    Ok((StatusCode::CREATED, Json(CreateMockResponse { url, id })).into_response())
}

/// Serve a stored mock verbatim.
async fn get_mock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let body = state
        .mocks
        .get_mock(&id)
        .ok_or_else(|| ApiError::NotFound("Mock not found".into()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

async fn generate_regex(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: RegexRequest = decode_body(&body, "Invalid request body")?;
    if req.description.is_empty() {
        return Err(ApiError::bad_request("Invalid request body"));
    }

    let answer = state.generator.generate_regex(&req.description).await?;
    Ok(Json(split_regex_response(&answer)).into_response())
}

async fn convert_config(body: Bytes) -> Result<Response, ApiError> {
    let req: ConvertRequest = decode_body(&body, "Invalid request body")?;
    if req.input.is_empty() {
        return Err(ApiError::bad_request("Invalid request body"));
    }

    let output = converter::convert(&req.input, &req.from, &req.to)?;
    Ok(Json(ConvertResponse { output }).into_response())
}

async fn generate_sql(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: SqlRequest = decode_body(&body, "Invalid request body")?;
    if req.description.is_empty() {
        return Err(ApiError::bad_request("Invalid request body"));
    }

    let query = state
        .generator
        .generate_sql(&req.schema, &req.description)
        .await?;
    Ok(Json(SqlResponse {
        query: query.trim().to_string(),
    })
    .into_response())
}

/// Re-indent any JSON document with two spaces. Tokens are copied verbatim.
async fn format_json(body: Bytes) -> Result<Response, ApiError> {
    let raw: Box<RawValue> = decode_body(&body, "Invalid JSON input")?;
    let formatted_json = json_format::indent(raw.get());
    Ok(Json(FormatJsonResponse { formatted_json }).into_response())
}
