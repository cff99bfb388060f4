pub mod monitor;
pub mod paths;
pub mod retry;
pub mod storage;

pub use monitor::{ConnectionMonitor, ConnectionState};
pub use retry::RetryPolicy;
