//! Generic retry-with-backoff for transient API failures.
//!
//! Every source client shares this wrapper instead of hand-rolling its own
//! status/sleep loop, so the backoff shape cannot drift between sources.
//! Rate limits back off exponentially; transport failures wait a fixed pause.

use crate::error::{DeepscoutError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry budget and backoff base for one rate-limit domain.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Backoff base; attempt `n` waits `base * 2^n`
    pub base: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given retry budget and backoff base.
    pub const fn new(max_retries: u32, base: Duration) -> Self {
        Self { max_retries, base }
    }

    /// Backoff duration before retrying after attempt `attempt` (0-indexed).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Fixed pause before retrying a transient transport failure.
const TRANSIENT_RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Whether an error is worth retrying: rate limits and transport failures.
/// Protocol-level failures (bad status, unparseable payload) are not.
pub fn is_retryable(err: &DeepscoutError) -> bool {
    matches!(
        err,
        DeepscoutError::RateLimited(_) | DeepscoutError::Network(_)
    )
}

/// Run `op`, retrying errors accepted by `retryable` up to the budget.
///
/// Rate limits back off exponentially per the policy; any other retryable
/// error waits a fixed one second. Errors the predicate rejects propagate
/// immediately; on budget exhaustion the last error is returned.
pub async fn retry_with_backoff<T, F, Fut, P>(
    policy: &RetryPolicy,
    mut retryable: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&DeepscoutError) -> bool,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && retryable(&e) => {
                let wait = match &e {
                    DeepscoutError::RateLimited(_) => policy.backoff(attempt),
                    _ => TRANSIENT_RETRY_PAUSE,
                };
                warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    wait_ms = wait.as_millis() as u64,
                    error = %e,
                    "Retrying after transient failure"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
