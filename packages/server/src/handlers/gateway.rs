use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::storage::{ObjectKey, ObjectStore};
use tokio_util::io::ReaderStream;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::extractors::auth::require_shared_secret;
use crate::models::gateway::{DeleteObjectResponse, HealthResponse, PutObjectResponse};
use crate::state::AppState;

/// Uploaded content is immutable by convention, so responses cache hard.
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Storage gateway entry point for everything under `/models/`.
///
/// GET/HEAD are public; PUT/DELETE require the shared secret; any other
/// method is rejected. OPTIONS never reaches this handler (preflight is
/// short-circuited by the CORS middleware).
#[instrument(skip(state, headers, body), fields(method = %method, tail = %tail))]
pub async fn gateway(
    State(state): State<AppState>,
    Path(tail): Path<String>,
    method: Method,
    headers: HeaderMap,
    // Deferred so a failed body buffer (over the size limit) surfaces as
    // the structured JSON error, not the extractor's plain-text reject.
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    // Storage key = request path minus the single leading slash.
    let key = format!("models/{tail}");
    let path = format!("/models/{tail}");

    match method {
        Method::GET => serve_object(&state, &key, &headers, false).await,
        Method::HEAD => serve_object(&state, &key, &headers, true).await,
        Method::PUT => put_object(&state, &headers, &key, path, body).await,
        Method::DELETE => delete_object(&state, &headers, &key, path).await,
        Method::OPTIONS => Ok(StatusCode::NO_CONTENT.into_response()),
        _ => Err(AppError::MethodNotAllowed),
    }
}

fn require_store(state: &AppState) -> Result<&Arc<dyn ObjectStore>, AppError> {
    state
        .store
        .as_ref()
        .ok_or_else(|| AppError::NotConfigured("Object store is not configured".into()))
}

async fn serve_object(
    state: &AppState,
    key: &str,
    headers: &HeaderMap,
    head_only: bool,
) -> Result<Response, AppError> {
    let store = require_store(state)?;
    // Keys that cannot validate cannot name a stored object.
    let key = ObjectKey::parse(key).map_err(|_| AppError::NotFound(format!("Object not found: {key}")))?;

    let (meta, reader) = if head_only {
        (store.stat(&key).await?, None)
    } else {
        let (meta, reader) = store.get(&key).await?;
        (meta, Some(reader))
    };

    let etag_value = format!("\"{}\"", meta.etag);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        // 304 repeats the validator and caching headers so caches can
        // refresh their stored metadata.
        let not_modified = Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, &etag_value)
            .header(header::CACHE_CONTROL, CACHE_CONTROL)
            .body(Body::empty())
            .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;
        return Ok(not_modified);
    }

    let content_type = meta
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    let body = match reader {
        Some(reader) => Body::from_stream(ReaderStream::new(reader)),
        None => Body::empty(),
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, meta.size.to_string())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

async fn put_object(
    state: &AppState,
    headers: &HeaderMap,
    key: &str,
    path: String,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    // Authentication happens before any storage access.
    require_shared_secret(state, headers)?;
    let store = require_store(state)?;

    let body = body.map_err(|e| AppError::Validation(e.body_text()))?;
    if body.is_empty() {
        return Err(AppError::Validation("Upload body must not be empty".into()));
    }

    let key = ObjectKey::parse(key)?;
    let content_type = key.guess_content_type();
    let size = store.put(&key, &body, content_type.as_deref()).await?;

    info!(%key, size, "Object stored");

    Ok(Json(PutObjectResponse {
        ok: true,
        path,
        size,
    })
    .into_response())
}

async fn delete_object(
    state: &AppState,
    headers: &HeaderMap,
    key: &str,
    path: String,
) -> Result<Response, AppError> {
    require_shared_secret(state, headers)?;
    let store = require_store(state)?;

    let key = ObjectKey::parse(key)?;
    // Deleting an absent key is success: DELETE is idempotent.
    let existed = store.delete(&key).await?;

    info!(%key, existed, "Object deleted");

    Ok(Json(DeleteObjectResponse {
        ok: true,
        deleted: path,
    })
    .into_response())
}

/// Service status and binding flags. Never touches storage.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "maquette",
        storage_configured: state.store.is_some(),
        secret_configured: state.config.gateway.shared_secret.is_some(),
        database: state.monitor.state(),
    })
}

/// Any path outside the gateway prefix and the API routes.
pub async fn fallback() -> AppError {
    AppError::NotFound("Route not found".into())
}
