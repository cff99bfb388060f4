use std::sync::Arc;

use common::monitor::ConnectionMonitor;
use common::storage::ObjectStore;
use sea_orm::{DatabaseConnection, DbErr};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// Object-store binding. `None` means unbound; operations that need it
    /// fail with NOT_CONFIGURED.
    pub store: Option<Arc<dyn ObjectStore>>,
    pub monitor: ConnectionMonitor,
}

impl AppState {
    /// Run a metadata-database operation under the configured retry policy,
    /// reporting the outcome to the connection monitor.
    pub async fn with_db_retry<T, F, Fut>(&self, op: F) -> Result<T, DbErr>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbErr>>,
    {
        let result = self.config.gateway.retry.run(op).await;
        match &result {
            Ok(_) => self.monitor.report_ok(),
            Err(e) => report_db_error(&self.monitor, e),
        }
        result
    }
}

/// Report a database error to the connection monitor.
///
/// Only transient errors (lost or unacquirable connections) flip the
/// monitor; query-level failures say nothing about connectivity.
pub fn report_db_error(monitor: &ConnectionMonitor, err: &DbErr) {
    use common::retry::RetryClass;
    if err.is_transient() {
        monitor.report_failure();
    }
}
