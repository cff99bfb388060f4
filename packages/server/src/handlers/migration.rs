use axum::Json;
use axum::extract::State;
use sea_orm::EntityTrait;
use tracing::{error, instrument};

use crate::entity::model;
use crate::error::ErrorBody;
use crate::extractors::auth::AdminKey;
use crate::migration::service;
use crate::models::migration::{
    MigrationApplyResponse, MigrationPreviewResponse, MigrationRollbackResponse,
};
use crate::state::{AppState, report_db_error};

#[utoipa::path(
    get,
    path = "/admin/migration/preview",
    tag = "Migration",
    operation_id = "previewMigration",
    summary = "Preview the path migration",
    description = "Read-only scan of every model record reporting its migration status and the \
        prospective canonical paths. Never mutates anything; a failed read degrades to an empty \
        result set with an error field.",
    responses(
        (status = 200, description = "Migration preview", body = MigrationPreviewResponse),
        (status = 401, description = "Unauthorized (UNAUTHORIZED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn preview(_admin: AdminKey, State(state): State<AppState>) -> Json<MigrationPreviewResponse> {
    let snapshot = state
        .with_db_retry(|| {
            let db = state.db.clone();
            async move { model::Entity::find().all(&db).await }
        })
        .await;

    match snapshot {
        Ok(records) => Json(service::preview_report(records)),
        Err(e) => {
            error!("Migration preview read failed: {e}");
            Json(service::preview_error(&e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/migration/apply",
    tag = "Migration",
    operation_id = "applyMigration",
    summary = "Migrate all pending records to the canonical layout",
    description = "Stages folder and canonical URLs for every record lacking the migration marker \
        and commits them in a single transaction. Idempotent: a second run migrates zero records. \
        Object-store bytes are not moved.",
    responses(
        (status = 200, description = "Apply outcome", body = MigrationApplyResponse),
        (status = 401, description = "Unauthorized (UNAUTHORIZED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn apply(_admin: AdminKey, State(state): State<AppState>) -> Json<MigrationApplyResponse> {
    match service::apply(&state.db).await {
        Ok(stats) => {
            state.monitor.report_ok();
            Json(MigrationApplyResponse {
                success: true,
                migrated_count: stats.migrated,
                skipped_count: stats.skipped,
                total_count: stats.total,
                message: format!(
                    "Migrated {} of {} records ({} skipped)",
                    stats.migrated, stats.total, stats.skipped
                ),
            })
        }
        Err(e) => {
            error!("Migration apply aborted: {e}");
            report_db_error(&state.monitor, &e);
            Json(MigrationApplyResponse {
                success: false,
                migrated_count: 0,
                skipped_count: 0,
                total_count: 0,
                message: format!("Migration aborted, no records were changed: {e}"),
            })
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/migration/rollback",
    tag = "Migration",
    operation_id = "rollbackMigration",
    summary = "Roll back all migrated records to the legacy layout",
    description = "Restores legacy flat-layout URLs from each record's current name and clears \
        the migration marker, in a single transaction. Metadata only: objects stored under \
        canonical keys are not moved back, so legacy URLs may point at keys whose bytes no \
        longer exist.",
    responses(
        (status = 200, description = "Rollback outcome", body = MigrationRollbackResponse),
        (status = 401, description = "Unauthorized (UNAUTHORIZED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn rollback(
    _admin: AdminKey,
    State(state): State<AppState>,
) -> Json<MigrationRollbackResponse> {
    match service::rollback(&state.db).await {
        Ok(count) => {
            state.monitor.report_ok();
            Json(MigrationRollbackResponse {
                success: true,
                rollback_count: count,
                message: format!("Rolled back {count} records to the legacy layout"),
            })
        }
        Err(e) => {
            error!("Migration rollback aborted: {e}");
            report_db_error(&state.monitor, &e);
            Json(MigrationRollbackResponse {
                success: false,
                rollback_count: 0,
                message: format!("Rollback aborted, no records were changed: {e}"),
            })
        }
    }
}
