use common::monitor::ConnectionState;
use serde::Serialize;
use utoipa::ToSchema;

/// Response to a successful gateway PUT.
#[derive(Serialize, ToSchema)]
pub struct PutObjectResponse {
    pub ok: bool,
    /// The request path, leading slash included.
    pub path: String,
    /// Bytes written.
    pub size: u64,
}

/// Response to a successful gateway DELETE.
#[derive(Serialize, ToSchema)]
pub struct DeleteObjectResponse {
    pub ok: bool,
    pub deleted: String,
}

/// Service status plus binding flags, served at `/` and `/health`.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// Whether an object-store binding is configured.
    pub storage_configured: bool,
    /// Whether the shared secret is configured.
    pub secret_configured: bool,
    /// Metadata-database connectivity as observed by the connection monitor.
    pub database: ConnectionState,
}
