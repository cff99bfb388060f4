use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use common::RetryPolicy;
use common::monitor::ConnectionMonitor;
use common::storage::memory::MemoryObjectStore;
use reqwest::Client;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::Value;
use uuid::Uuid;

use server::config::{AppConfig, CorsConfig, DatabaseConfig, GatewayConfig, ServerConfig};
use server::entity::model;
use server::state::AppState;

/// Shared secret configured for test servers.
pub const SECRET: &str = "test-secret-for-integration-tests";

/// Header carrying the shared secret.
pub const AUTH_HEADER: &str = "X-Custom-Auth-Key";

/// First allow-list entry, the CORS fallback origin.
pub const PRIMARY_ORIGIN: &str = "https://gallery.example";

pub mod routes {
    pub const MODELS: &str = "/api/v1/models";
    pub const MODEL_PATHS: &str = "/api/v1/models/paths";
    pub const MIGRATION_PREVIEW: &str = "/api/v1/admin/migration/preview";
    pub const MIGRATION_APPLY: &str = "/api/v1/admin/migration/apply";
    pub const MIGRATION_ROLLBACK: &str = "/api/v1/admin/migration/rollback";
    pub const HEALTH: &str = "/health";

    pub fn model(id: &str) -> String {
        format!("/api/v1/models/{id}")
    }

    pub fn model_download(id: &str) -> String {
        format!("/api/v1/models/{id}/download")
    }
}

/// Options for spawning a test server.
pub struct SpawnOptions {
    pub with_secret: bool,
    pub with_store: bool,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            with_secret: true,
            with_store: true,
        }
    }
}

/// A running test server backed by a temp-dir SQLite database and a
/// spy object store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub store: Arc<MemoryObjectStore>,
    _dir: tempfile::TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    /// Raw response body.
    pub bytes: Vec<u8>,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res.bytes().await.expect("Failed to read body").to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            body,
            bytes,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(SpawnOptions::default()).await
    }

    pub async fn spawn_without_secret() -> Self {
        Self::spawn_with(SpawnOptions {
            with_secret: false,
            ..Default::default()
        })
        .await
    }

    pub async fn spawn_without_store() -> Self {
        Self::spawn_with(SpawnOptions {
            with_store: false,
            ..Default::default()
        })
        .await
    }

    pub async fn spawn_with(options: SpawnOptions) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("maquette-test.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let store = Arc::new(MemoryObjectStore::new());

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![
                        PRIMARY_ORIGIN.to_string(),
                        "http://localhost:5173".to_string(),
                    ],
                    max_age: 86400,
                },
            },
            database: DatabaseConfig {
                url: db_url.clone(),
            },
            gateway: GatewayConfig {
                shared_secret: options.with_secret.then(|| SECRET.to_string()),
                max_object_size: 16 * 1024 * 1024,
                retry: RetryPolicy {
                    max_attempts: 2,
                    base_delay_ms: 1,
                    max_delay_ms: 5,
                },
            },
            storage: None,
        };

        let state = AppState {
            db: db.clone(),
            config,
            store: options
                .with_store
                .then(|| store.clone() as Arc<dyn common::storage::ObjectStore>),
            monitor: ConnectionMonitor::new(),
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            store,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn head(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .head(self.url(path))
            .send()
            .await
            .expect("Failed to send HEAD request");
        TestResponse::from_response(res).await
    }

    pub async fn get_with_header(&self, path: &str, name: &str, value: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header(name, value)
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn options(&self, path: &str, origin: &str) -> TestResponse {
        let res = self
            .client
            .request(reqwest::Method::OPTIONS, self.url(path))
            .header("Origin", origin)
            .send()
            .await
            .expect("Failed to send OPTIONS request");
        TestResponse::from_response(res).await
    }

    pub async fn put_object(&self, path: &str, data: Vec<u8>, secret: Option<&str>) -> TestResponse {
        let mut req = self.client.put(self.url(path)).body(data);
        if let Some(secret) = secret {
            req = req.header(AUTH_HEADER, secret);
        }
        let res = req.send().await.expect("Failed to send PUT request");
        TestResponse::from_response(res).await
    }

    pub async fn delete_object(&self, path: &str, secret: Option<&str>) -> TestResponse {
        let mut req = self.client.delete(self.url(path));
        if let Some(secret) = secret {
            req = req.header(AUTH_HEADER, secret);
        }
        let res = req.send().await.expect("Failed to send DELETE request");
        TestResponse::from_response(res).await
    }

    pub async fn post_json(&self, path: &str, body: &Value, secret: Option<&str>) -> TestResponse {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(secret) = secret {
            req = req.header(AUTH_HEADER, secret);
        }
        let res = req.send().await.expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn post_empty(&self, path: &str, secret: Option<&str>) -> TestResponse {
        let mut req = self.client.post(self.url(path));
        if let Some(secret) = secret {
            req = req.header(AUTH_HEADER, secret);
        }
        let res = req.send().await.expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn patch_json(&self, path: &str, body: &Value, secret: Option<&str>) -> TestResponse {
        let mut req = self.client.patch(self.url(path)).json(body);
        if let Some(secret) = secret {
            req = req.header(AUTH_HEADER, secret);
        }
        let res = req.send().await.expect("Failed to send PATCH request");
        TestResponse::from_response(res).await
    }

    /// Create a model through the API and return its ID.
    pub async fn create_model(&self, name: &str) -> String {
        let res = self
            .post_json(
                routes::MODELS,
                &serde_json::json!({
                    "name": name,
                    "category": "architecture",
                    "description": "test model",
                    "ifc_size": 1024,
                    "xkt_size": 512,
                }),
                Some(SECRET),
            )
            .await;
        assert_eq!(res.status, 201, "create_model failed: {}", res.body);
        res.body["id"].as_str().unwrap().to_string()
    }

    /// Insert a record still on the legacy flat layout, bypassing the API.
    pub async fn seed_legacy_model(&self, name: &str) -> Uuid {
        let file = name.split_whitespace().collect::<Vec<_>>().join("-");
        let now = Utc::now();
        let id = Uuid::now_v7();
        let record = model::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            category: Set("architecture".to_string()),
            description: Set(String::new()),
            folder: Set(None),
            ifc_url: Set(format!("/files/input/{file}.ifc")),
            xkt_url: Set(format!("/files/output/{file}.xkt")),
            ifc_size: Set(2048),
            xkt_size: Set(1024),
            downloads: Set(0),
            featured: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        record
            .insert(&self.db)
            .await
            .expect("Failed to seed legacy model");
        id
    }

    /// Snapshot of all model records, for no-mutation assertions.
    pub async fn all_records(&self) -> Vec<model::Model> {
        model::Entity::find()
            .all(&self.db)
            .await
            .expect("Failed to read records")
    }
}
