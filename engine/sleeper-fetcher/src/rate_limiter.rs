//! Outbound request pacing

use crate::config::RateLimitConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Fixed-interval pacing shared by every outbound request.
///
/// Consecutive `acquire` calls return at least `interval` apart. Callers queue
/// on the mutex, so the ceiling also holds when requests are issued from
/// several tasks.
pub struct RateLimiter {
    /// Minimum spacing between two requests
    interval: Duration,

    /// When the previous request was released
    last_issued: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_interval(config.interval())
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self { interval, last_issued: Mutex::new(None) }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request may be issued
    pub async fn acquire(&self) {
        let mut last_issued = self.last_issued.lock().await;

        if let Some(previous) = *last_issued {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }

        *last_issued = Some(Instant::now());
    }
}
