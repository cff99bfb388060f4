use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tracing::warn;

/// Classifies errors as transient (worth retrying) or permanent.
///
/// Permanent errors are returned immediately; only transient errors
/// consume retry attempts.
pub trait RetryClass {
    fn is_transient(&self) -> bool;
}

#[cfg(feature = "sea-orm")]
impl RetryClass for sea_orm::DbErr {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_)
        )
    }
}

/// Reusable exponential-backoff retry policy.
///
/// Applied uniformly by metadata-database callers; object-store writes are
/// never retried (the uploading client already controls its own retries).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,
    /// Base delay before the first retry. Default: 200ms.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on any single delay. Default: 5000ms.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u8 {
    3
}
fn default_base_delay_ms() -> u64 {
    200
}
fn default_max_delay_ms() -> u64 {
    5000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Run `op`, retrying transient failures with backoff until an attempt
    /// succeeds, a permanent error occurs, or `max_attempts` is exhausted.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryClass + std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt: u8 = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient error, retrying: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}
