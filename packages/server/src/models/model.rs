use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entity::model;

#[derive(Deserialize, ToSchema)]
pub struct CreateModelRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Byte size of the uploaded IFC file, as reported by the uploader.
    pub ifc_size: i64,
    /// Byte size of the uploaded XKT file, as reported by the uploader.
    pub xkt_size: i64,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Deserialize, Default, PartialEq, ToSchema)]
pub struct UpdateModelRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct ModelResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Present iff the record uses the canonical folder layout.
    pub folder: Option<String>,
    pub ifc_url: String,
    pub xkt_url: String,
    pub ifc_size: i64,
    pub xkt_size: i64,
    pub downloads: i64,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<model::Model> for ModelResponse {
    fn from(m: model::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            category: m.category,
            description: m.description,
            folder: m.folder,
            ifc_url: m.ifc_url,
            xkt_url: m.xkt_url,
            ifc_size: m.ifc_size,
            xkt_size: m.xkt_size,
            downloads: m.downloads,
            featured: m.featured,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ModelListResponse {
    pub models: Vec<ModelResponse>,
    pub total: u64,
}

#[derive(Deserialize, IntoParams)]
pub struct ModelListQuery {
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by featured flag.
    pub featured: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct ModelPathsRequest {
    pub name: String,
}

/// Canonical upload paths for a model name, computed before the record
/// exists so both files can be uploaded first.
#[derive(Serialize, ToSchema)]
pub struct ModelPathsResponse {
    pub folder: String,
    pub ifc_url: String,
    pub xkt_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct DownloadResponse {
    pub downloads: i64,
}
