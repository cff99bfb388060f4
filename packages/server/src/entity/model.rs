use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-readable display name.
    pub name: String,
    pub category: String,
    pub description: String,

    /// Canonical folder slug. Present if and only if the record uses the
    /// folder-per-model storage layout; this is the migration marker.
    /// Never recomputed when `name` changes afterwards.
    pub folder: Option<String>,

    /// Storage paths, either legacy flat form (`/files/input/...`) or
    /// canonical folder form (`/models/<folder>/...`).
    pub ifc_url: String,
    pub xkt_url: String,

    /// Advisory byte counts, never verified against the object store.
    pub ifc_size: i64,
    pub xkt_size: i64,

    /// Display counter; incremented read-modify-write, not exact.
    pub downloads: i64,

    pub featured: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
