use common::RetryPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allow-listed origins. The first entry is the fallback value echoed
    /// to origins outside the list.
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Shared secret compared byte-for-byte against `X-Custom-Auth-Key`.
    /// Unset means mutating requests fail with NOT_CONFIGURED.
    pub shared_secret: Option<String>,
    /// Maximum accepted PUT body, in bytes.
    pub max_object_size: u64,
    /// Retry policy for metadata-database reads.
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Object-store binding. Absent section means the store is unbound and
/// gateway operations fail with NOT_CONFIGURED.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Filesystem {
        root: std::path::PathBuf,
    },
    S3 {
        endpoint: String,
        region: String,
        bucket: String,
        access_key: String,
        secret_key: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub storage: Option<StorageConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["http://localhost:5173"])?
            .set_default("server.cors.max_age", 86400)?
            .set_default("database.url", "sqlite://data/maquette.db?mode=rwc")?
            .set_default("gateway.max_object_size", 256 * 1024 * 1024i64)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., MAQUETTE__GATEWAY__SHARED_SECRET)
            .add_source(Environment::with_prefix("MAQUETTE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
