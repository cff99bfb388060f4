use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

/// Observed connectivity of the metadata database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Current connection state plus when it was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub state: ConnectionState,
    pub since: DateTime<Utc>,
}

/// Injectable connection-state observer.
///
/// Components report the outcome of their database calls; anyone holding a
/// clone can read the current state or subscribe to transitions. Owned by
/// the application state rather than living in a process-wide singleton.
#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    tx: watch::Sender<ConnectionSnapshot>,
}

impl ConnectionMonitor {
    /// Create a monitor that starts out `Connected` (the server only comes
    /// up after an initial successful connection).
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionSnapshot {
            state: ConnectionState::Connected,
            since: Utc::now(),
        });
        Self { tx }
    }

    /// Record a successful database operation.
    pub fn report_ok(&self) {
        self.transition(ConnectionState::Connected);
    }

    /// Record a failed database operation.
    pub fn report_failure(&self) {
        self.transition(ConnectionState::Disconnected);
    }

    fn transition(&self, next: ConnectionState) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.state == next {
                return false;
            }
            match next {
                ConnectionState::Connected => info!("Database connection restored"),
                ConnectionState::Disconnected => warn!("Database connection lost"),
            }
            snapshot.state = next;
            snapshot.since = Utc::now();
            true
        });
    }

    pub fn state(&self) -> ConnectionState {
        self.tx.borrow().state
    }

    /// When the current state was entered.
    pub fn since(&self) -> DateTime<Utc> {
        self.tx.borrow().since
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Subscribe to state transitions. Receivers wake on every change and
    /// can read the latest snapshot at any time.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
