use std::net::SocketAddr;
use std::sync::Arc;

use common::monitor::ConnectionMonitor;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::s3::S3ObjectStore;
use common::storage::ObjectStore;
use tracing::{Level, info, warn};

use server::config::{AppConfig, StorageConfig};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    info!("Database initialized");

    let store = build_store(&config).await?;
    if store.is_none() {
        warn!("No object store configured; gateway operations will fail with NOT_CONFIGURED");
    }
    if config.gateway.shared_secret.is_none() {
        warn!("No shared secret configured; mutating requests will fail with NOT_CONFIGURED");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        config,
        store,
        monitor: ConnectionMonitor::new(),
    };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn ObjectStore>>> {
    let store: Arc<dyn ObjectStore> = match &config.storage {
        None => return Ok(None),
        Some(StorageConfig::Filesystem { root }) => {
            info!("Using filesystem object store at {}", root.display());
            Arc::new(FilesystemObjectStore::new(root.clone()).await?)
        }
        Some(StorageConfig::S3 {
            endpoint,
            region,
            bucket,
            access_key,
            secret_key,
        }) => {
            info!("Using S3 object store {} at {}", bucket, endpoint);
            Arc::new(S3ObjectStore::new(
                endpoint, region, bucket, access_key, secret_key,
            )?)
        }
    };
    Ok(Some(store))
}
