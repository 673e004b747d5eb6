//! Retry combinator for source network calls.
//!
//! Every network call a source issues goes through [`retry_fetch`], which
//! enforces the backoff contract: exponential delays doubling from a
//! minimum up to a maximum, with a bounded attempt count. Only transport
//! failures are retried; a malformed response fails on the first attempt.

use crate::traits::FetchError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Ceiling for the doubled delays.
    pub max_delay: Duration,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1");
        }
        if self.min_delay > self.max_delay {
            return Err("min_delay must not exceed max_delay");
        }
        Ok(())
    }

    /// Delay to wait after the given failed attempt (1-indexed).
    ///
    /// Doubles from `min_delay` and clamps at `max_delay`:
    /// attempt 1 -> 2s, 2 -> 4s, 3 -> 8s, 4 -> 16s, 5 -> 30s (capped).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.min_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget runs out. The last error is returned unchanged.
pub async fn retry_fetch<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
