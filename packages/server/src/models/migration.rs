use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// One record's migration status as reported by preview.
#[derive(Serialize, ToSchema)]
pub struct MigrationPreviewItem {
    pub id: Uuid,
    pub name: String,
    /// Whether the record already carries a `folder` (migration marker).
    pub migrated: bool,
    pub current_ifc_url: String,
    pub current_xkt_url: String,
    /// Prospective canonical folder recomputed from the current name.
    /// `None` when the name has no valid slug.
    pub new_folder: Option<String>,
    pub new_ifc_url: Option<String>,
    pub new_xkt_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MigrationPreviewResponse {
    pub models: Vec<MigrationPreviewItem>,
    pub total_count: u64,
    pub already_migrated: u64,
    pub needs_migration: u64,
    /// Set when the read failed; preview degrades to an empty result set
    /// rather than an HTTP error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MigrationApplyResponse {
    pub success: bool,
    pub migrated_count: u64,
    pub skipped_count: u64,
    pub total_count: u64,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct MigrationRollbackResponse {
    pub success: bool,
    pub rollback_count: u64,
    pub message: String,
}
