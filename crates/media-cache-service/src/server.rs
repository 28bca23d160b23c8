//! HTTP server for media cache endpoints
//!
//! Provides /health, /files/{file_name}, /records and /sweep endpoints.

use crate::types::{
    ErrorResponse, HealthResponse, SaveFileRequest, SaveRecordRequest, SavedFileResponse,
    SavedRecordResponse, SweepResponse,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use media_cache_store::{CacheStore, CacheStoreError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: CacheStore,
    /// Age threshold used by sweeps
    pub max_age: Duration,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(cache: CacheStore, max_age: Duration) -> Self {
        Self {
            cache,
            max_age,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/files/{file_name}",
            get(get_file).put(save_file).delete(delete_file),
        )
        .route("/records", post(save_record))
        .route("/records/{file_name}", get(get_record))
        .route("/sweep", post(sweep))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

/// Serve a cached file
async fn get_file(State(state): State<SharedState>, Path(file_name): Path<String>) -> Response {
    let Some(path) = state.cache.get_file(&file_name).await else {
        return error_response(StatusCode::NOT_FOUND, "File not cached");
    };

    match tokio::fs::read(&path).await {
        Ok(data) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CACHE_CONTROL, "public, max-age=86400")
            .body(Body::from(data))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            // Swept or deleted between lookup and read
            warn!(file_name = %file_name, error = %e, "Failed to read cached file");
            error_response(StatusCode::NOT_FOUND, "File not cached")
        }
    }
}

/// Populate a file from a remote URL unless it is already cached
async fn save_file(
    State(state): State<SharedState>,
    Path(file_name): Path<String>,
    Json(request): Json<SaveFileRequest>,
) -> Response {
    match state.cache.try_save_file(&request.url, &file_name).await {
        Ok(path) => {
            match tokio::fs::metadata(&path).await {
                Ok(metadata) => Json(SavedFileResponse {
                    file_name,
                    size: metadata.len(),
                })
                .into_response(),
                Err(e) => {
                    // Swept or deleted right after it was cached
                    warn!(file_name = %file_name, error = %e, "Failed to stat cached file");
                    error_response(StatusCode::NOT_FOUND, "File not cached")
                }
            }
        }
        Err(CacheStoreError::InvalidFileName(_)) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid file name")
        }
        Err(e) => {
            warn!(file_name = %file_name, url = %request.url, error = %e, "Failed to cache file");
            error_response(StatusCode::BAD_GATEWAY, "Download failed")
        }
    }
}

async fn delete_file(
    State(state): State<SharedState>,
    Path(file_name): Path<String>,
) -> Response {
    if state.cache.delete_file(&file_name).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "File not cached")
    }
}

/// Cache a media file together with its metadata record
async fn save_record(
    State(state): State<SharedState>,
    Json(request): Json<SaveRecordRequest>,
) -> Response {
    let saved = state
        .cache
        .save_record(
            &request.record,
            &request.url,
            &request.media_file_name,
            &request.metadata_file_name,
        )
        .await;

    if !saved {
        return error_response(StatusCode::BAD_GATEWAY, "Failed to cache record");
    }

    (
        StatusCode::CREATED,
        Json(SavedRecordResponse {
            media_file_name: request.media_file_name,
            metadata_file_name: request.metadata_file_name,
        }),
    )
        .into_response()
}

async fn get_record(State(state): State<SharedState>, Path(file_name): Path<String>) -> Response {
    match state.cache.get_record::<serde_json::Value>(&file_name).await {
        Some(record) => Json(record).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Record not cached"),
    }
}

/// Run an expiry sweep immediately
async fn sweep(State(state): State<SharedState>) -> Json<SweepResponse> {
    let removed = state.cache.sweep_expired(state.max_age).await;
    Json(SweepResponse { removed })
}
