// src/api/rate_limiter.rs
//! Minimum spacing between upstream request starts.
//!
//! Each caller reserves the next free start slot and sleeps until it. Only the starts are
//! spaced out; the requests themselves still run concurrently once started.

use log::debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct RequestSpacer {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestSpacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits for this caller's start slot.
    pub async fn wait_turn(&self, endpoint: &str) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + self.min_interval);
            slot
        };

        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            debug!("🚦 Spacing request to {} by {:?}", endpoint, wait);
        }
        sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_spacer_does_not_wait() {
        let spacer = RequestSpacer::disabled();
        let start = Instant::now();
        for _ in 0..5 {
            spacer.wait_turn("/coins/list/v1").await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_concurrent_callers_get_distinct_slots() {
        let spacer = RequestSpacer::new(Duration::from_millis(20));
        let start = Instant::now();

        tokio::join!(
            spacer.wait_turn("/a"),
            spacer.wait_turn("/b"),
            spacer.wait_turn("/c"),
        );

        // third slot starts two intervals after the first
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
