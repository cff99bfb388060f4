use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::paths::{canonical_paths, url_to_key};
use common::storage::ObjectKey;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::entity::model;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminKey;
use crate::extractors::json::AppJson;
use crate::models::model::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/models",
    tag = "Models",
    operation_id = "listModels",
    summary = "List models",
    description = "Returns all models, newest first, with optional category and featured filters.",
    params(ModelListQuery),
    responses(
        (status = 200, description = "List of models", body = ModelListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelListQuery>,
) -> Result<Json<ModelListResponse>, AppError> {
    let records = state
        .with_db_retry(|| {
            let db = state.db.clone();
            let category = query.category.clone();
            let featured = query.featured;
            async move {
                let mut select = model::Entity::find();
                if let Some(category) = category {
                    select = select.filter(model::Column::Category.eq(category));
                }
                if let Some(featured) = featured {
                    select = select.filter(model::Column::Featured.eq(featured));
                }
                select
                    .order_by_desc(model::Column::CreatedAt)
                    .all(&db)
                    .await
            }
        })
        .await?;

    let total = records.len() as u64;
    let models = records.into_iter().map(ModelResponse::from).collect();

    Ok(Json(ModelListResponse { models, total }))
}

#[utoipa::path(
    get,
    path = "/models/{id}",
    tag = "Models",
    operation_id = "getModel",
    summary = "Fetch one model",
    params(("id" = Uuid, Path, description = "Model ID")),
    responses(
        (status = 200, description = "Model", body = ModelResponse),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ModelResponse>, AppError> {
    let record = find_model(&state, id).await?;
    Ok(Json(ModelResponse::from(record)))
}

#[utoipa::path(
    post,
    path = "/models/paths",
    tag = "Models",
    operation_id = "computeModelPaths",
    summary = "Compute canonical upload paths for a model name",
    description = "Pure path derivation, no record is created. Used before uploading: both files \
        must land in storage before the metadata record is written.",
    request_body = ModelPathsRequest,
    responses(
        (status = 200, description = "Canonical paths", body = ModelPathsResponse),
        (status = 400, description = "Name has no valid slug (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHORIZED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn compute_model_paths(
    _admin: AdminKey,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ModelPathsRequest>,
) -> Result<Json<ModelPathsResponse>, AppError> {
    let paths = canonical_paths(&payload.name).ok_or_else(invalid_name)?;
    Ok(Json(ModelPathsResponse {
        folder: paths.folder,
        ifc_url: paths.ifc_url,
        xkt_url: paths.xkt_url,
    }))
}

#[utoipa::path(
    post,
    path = "/models",
    tag = "Models",
    operation_id = "createModel",
    summary = "Create a model record",
    description = "Creates the metadata record for a model whose IFC and XKT files have already \
        been uploaded. The server recomputes the canonical folder and URLs from the name, so new \
        records are born migrated.",
    request_body = CreateModelRequest,
    responses(
        (status = 201, description = "Model created", body = ModelResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHORIZED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_model(
    _admin: AdminKey,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateModelRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.category.trim().is_empty() {
        return Err(AppError::Validation("Category must not be empty".into()));
    }
    let paths = canonical_paths(&payload.name).ok_or_else(invalid_name)?;

    let now = Utc::now();
    let new_model = model::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(payload.name.trim().to_string()),
        category: Set(payload.category.trim().to_string()),
        description: Set(payload.description),
        folder: Set(Some(paths.folder)),
        ifc_url: Set(paths.ifc_url),
        xkt_url: Set(paths.xkt_url),
        ifc_size: Set(payload.ifc_size),
        xkt_size: Set(payload.xkt_size),
        downloads: Set(0),
        featured: Set(payload.featured),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let record = new_model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ModelResponse::from(record))))
}

#[utoipa::path(
    patch,
    path = "/models/{id}",
    tag = "Models",
    operation_id = "updateModel",
    summary = "Update model fields",
    description = "Partial update of name, category, description and featured. The folder slug \
        and storage URLs are never touched: a rename after migration does not recompute the slug.",
    params(("id" = Uuid, Path, description = "Model ID")),
    request_body = UpdateModelRequest,
    responses(
        (status = 200, description = "Updated model", body = ModelResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_model(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateModelRequest>,
) -> Result<Json<ModelResponse>, AppError> {
    let record = find_model(&state, id).await?;

    let mut active: model::ActiveModel = record.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name must not be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(category) = payload.category {
        let category = category.trim().to_string();
        if category.is_empty() {
            return Err(AppError::Validation("Category must not be empty".into()));
        }
        active.category = Set(category);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;
    Ok(Json(ModelResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/models/{id}",
    tag = "Models",
    operation_id = "deleteModel",
    summary = "Delete a model",
    description = "Removes both backing storage objects, then the metadata record. Objects that \
        are already absent are tolerated.",
    params(("id" = Uuid, Path, description = "Model ID")),
    responses(
        (status = 204, description = "Model deleted"),
        (status = 401, description = "Unauthorized (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Object store unbound (NOT_CONFIGURED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_model(
    _admin: AdminKey,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let store = state
        .store
        .as_ref()
        .ok_or_else(|| AppError::NotConfigured("Object store is not configured".into()))?;

    let record = find_model(&state, id).await?;

    // Storage objects go first so a failed delete never orphans bytes
    // behind a missing record.
    for url in [&record.ifc_url, &record.xkt_url] {
        match ObjectKey::parse(url_to_key(url)) {
            Ok(key) => {
                store.delete(&key).await?;
            }
            Err(e) => {
                // A URL that never validated cannot name a stored object.
                warn!(url, "Skipping storage delete for invalid key: {e}");
            }
        }
    }

    model::Entity::delete_by_id(record.id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/models/{id}/download",
    tag = "Models",
    operation_id = "recordModelDownload",
    summary = "Record a download",
    description = "Read-modify-write increment of the display counter. Concurrent increments \
        can lose an update; the counter is advisory, not billing-grade.",
    params(("id" = Uuid, Path, description = "Model ID")),
    responses(
        (status = 200, description = "New download count", body = DownloadResponse),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn record_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadResponse>, AppError> {
    let record = find_model(&state, id).await?;

    let downloads = record.downloads + 1;
    let mut active: model::ActiveModel = record.into();
    active.downloads = Set(downloads);
    // The download counter does not bump updated_at.
    active.update(&state.db).await?;

    Ok(Json(DownloadResponse { downloads }))
}

fn invalid_name() -> AppError {
    AppError::Validation("Model name must contain at least one alphanumeric character".into())
}

async fn find_model(state: &AppState, id: Uuid) -> Result<model::Model, AppError> {
    state
        .with_db_retry(|| {
            let db = state.db.clone();
            async move { model::Entity::find_by_id(id).one(&db).await }
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Model not found".into()))
}
