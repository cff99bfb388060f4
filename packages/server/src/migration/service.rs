//! Path migration between the legacy flat storage layout and the
//! canonical folder-per-model layout.
//!
//! Apply and rollback rewrite metadata only; object-store bytes are never
//! moved or verified. Both commit all staged updates in one transaction,
//! so a fleet is never left half-migrated by a mid-batch failure.

use chrono::Utc;
use common::paths::{canonical_paths, legacy_paths};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};
use tracing::info;

use crate::entity::model;
use crate::models::migration::{MigrationPreviewItem, MigrationPreviewResponse};

/// Counts returned by a successful apply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyStats {
    pub migrated: u64,
    pub skipped: u64,
    pub total: u64,
}

/// Build the preview report from a snapshot of all records.
///
/// Pure: recomputes prospective canonical paths from each record's current
/// name and flags which records already carry the migration marker.
pub fn preview_report(records: Vec<model::Model>) -> MigrationPreviewResponse {
    let total_count = records.len() as u64;
    let mut already_migrated = 0u64;

    let models: Vec<MigrationPreviewItem> = records
        .into_iter()
        .map(|record| {
            let migrated = record.folder.is_some();
            if migrated {
                already_migrated += 1;
            }
            let prospective = canonical_paths(&record.name);
            MigrationPreviewItem {
                id: record.id,
                name: record.name,
                migrated,
                current_ifc_url: record.ifc_url,
                current_xkt_url: record.xkt_url,
                new_folder: prospective.as_ref().map(|p| p.folder.clone()),
                new_ifc_url: prospective.as_ref().map(|p| p.ifc_url.clone()),
                new_xkt_url: prospective.map(|p| p.xkt_url),
            }
        })
        .collect();

    MigrationPreviewResponse {
        models,
        total_count,
        already_migrated,
        needs_migration: total_count - already_migrated,
        error: None,
    }
}

/// Preview result when the snapshot read failed: empty set plus the error,
/// never an HTTP failure.
pub fn preview_error(err: &DbErr) -> MigrationPreviewResponse {
    MigrationPreviewResponse {
        models: Vec::new(),
        total_count: 0,
        already_migrated: 0,
        needs_migration: 0,
        error: Some(err.to_string()),
    }
}

/// Migrate every record lacking a `folder` to the canonical layout.
///
/// Records already carrying `folder` are untouched, so a second run
/// reports zero migrations. Records whose name slugs to the empty string
/// cannot be migrated and count as skipped. All staged updates commit
/// together or not at all.
pub async fn apply(db: &DatabaseConnection) -> Result<ApplyStats, DbErr> {
    let txn = db.begin().await?;

    let records = model::Entity::find().all(&txn).await?;
    let total = records.len() as u64;
    let mut migrated = 0u64;
    let mut skipped = 0u64;

    for record in records {
        if record.folder.is_some() {
            skipped += 1;
            continue;
        }

        let Some(paths) = canonical_paths(&record.name) else {
            skipped += 1;
            continue;
        };

        let mut active: model::ActiveModel = record.into();
        active.folder = Set(Some(paths.folder));
        active.ifc_url = Set(paths.ifc_url);
        active.xkt_url = Set(paths.xkt_url);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
        migrated += 1;
    }

    txn.commit().await?;
    info!(migrated, skipped, total, "Migration apply committed");

    Ok(ApplyStats {
        migrated,
        skipped,
        total,
    })
}

/// Restore legacy flat-layout paths for every migrated record and clear
/// the migration marker. Metadata only: objects at the canonical keys are
/// left in place, and nothing checks that objects still exist at the
/// legacy keys.
pub async fn rollback(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let txn = db.begin().await?;

    let records = model::Entity::find().all(&txn).await?;
    let mut rolled_back = 0u64;

    for record in records {
        if record.folder.is_none() {
            continue;
        }

        let legacy = legacy_paths(&record.name);
        let mut active: model::ActiveModel = record.into();
        active.folder = Set(None);
        active.ifc_url = Set(legacy.ifc_url);
        active.xkt_url = Set(legacy.xkt_url);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
        rolled_back += 1;
    }

    txn.commit().await?;
    info!(rolled_back, "Migration rollback committed");

    Ok(rolled_back)
}
