// src/api/backoff.rs
//! Rate-limit backoff for upstream requests.
//!
//! The schedule is a pure function of the attempt index; `retry_rate_limited` drives it and
//! only retries attempts that came back 429.

use crate::error::{RefreshError, Result};
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Exponential backoff: no delay before the first attempt, then `base_delay`, doubling
/// for every further attempt (0s, 10s, 20s with the defaults).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(10),
            max_attempts: 3,
        }
    }
}

impl BackoffSchedule {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Delay to wait before `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `attempt_fn` until it returns something other than a single 429, or the schedule is
/// out of attempts. The closure receives the 0-based attempt index.
pub async fn retry_rate_limited<T, F, Fut>(
    schedule: &BackoffSchedule,
    endpoint: &str,
    mut attempt_fn: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 0..schedule.max_attempts {
        let delay = schedule.delay(attempt);
        if !delay.is_zero() {
            warn!(
                "⏳ 429 back-off for {} – waiting {:?} ({}/{})",
                endpoint,
                delay,
                attempt,
                schedule.max_attempts - 1
            );
            sleep(delay).await;
        }

        match attempt_fn(attempt).await {
            Err(e) if e.is_retryable() => {
                debug!("Attempt {} for {} rate limited", attempt + 1, endpoint);
                continue;
            }
            other => return other,
        }
    }

    Err(RefreshError::RateLimitExhausted {
        endpoint: endpoint.to_string(),
        attempts: schedule.max_attempts,
    })
}
