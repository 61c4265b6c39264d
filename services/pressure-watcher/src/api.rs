//! Upload API: receives gauge photos and serves stored readings

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::gauge::GaugeReader;
use crate::reading::{Reading, Timestamp, UploadResponse};
use crate::store::StoreHandle;

/// Name of the multipart part carrying the image
pub const FILE_FIELD: &str = "file";

const DEFAULT_READINGS_LIMIT: usize = 20;

/// API application state
#[derive(Clone)]
pub struct ApiState {
    /// `None` when no store is configured; uploads still succeed
    pub store: Option<StoreHandle>,
    pub gauge: Arc<dyn GaugeReader>,
    pub persist_images: bool,
    /// Upper bound for `/api/readings?limit=`
    pub max_readings: usize,
}

/// Error answered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

/// Build the upload API router
pub fn build_router(state: ApiState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/upload-image", post(upload_handler))
        .route("/api/readings", get(readings_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Pressure Watcher API is running",
    }))
}

async fn upload_handler(
    State(api): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(multipart_rejection)?;
    let image = read_file_field(&mut multipart).await?;

    let response = process_upload(&api, image).await.map_err(|e| {
        tracing::warn!("Upload failed: {}", e);
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error processing image: {}", e),
        )
    })?;

    Ok(Json(response))
}

fn missing_file_field() -> ApiError {
    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Missing required form field '{}'", FILE_FIELD),
    )
}

/// A request that is not a multipart form carries no `file` part at all
fn multipart_rejection(rejection: MultipartRejection) -> ApiError {
    match rejection {
        MultipartRejection::InvalidBoundary(_) => missing_file_field(),
        other => ApiError::new(other.status(), other.body_text()),
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), format!("Invalid multipart body: {}", e)))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(missing_file_field())
}

/// Read the gauge, timestamp the observation and store it
pub async fn process_upload(api: &ApiState, image: Vec<u8>) -> crate::Result<UploadResponse> {
    let pressure = api.gauge.read_pressure(&image)?;
    let timestamp = Timestamp::now();
    let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image);

    match &api.store {
        Some(store) => {
            let mut reading = Reading::new(pressure, timestamp.clone());
            if api.persist_images {
                reading.image = Some(image_base64.clone());
            }
            let id = store.add(reading).await?;
            tracing::info!("Stored reading {} ({} PSI)", id, pressure);
        }
        None => tracing::debug!("No reading store configured, skipping insert"),
    }

    Ok(UploadResponse {
        timestamp: Some(timestamp),
        pressure: Some(pressure),
        image: Some(image_base64),
        status: Some("success".to_string()),
    })
}

#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    limit: Option<usize>,
}

async fn readings_handler(
    State(api): State<ApiState>,
    query: Result<Query<ReadingsQuery>, QueryRejection>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    })?;
    let Some(store) = &api.store else {
        return Ok(Json(Vec::new()));
    };

    let limit = query
        .limit
        .unwrap_or(DEFAULT_READINGS_LIMIT)
        .min(api.max_readings);
    let readings = store.latest(limit).await.map_err(|e| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(readings))
}
