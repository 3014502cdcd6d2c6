//! Minimum inter-request spacing
//!
//! The harvester is strictly sequential, so politeness reduces to a single
//! rule: at least the configured interval passes between the completion of
//! one `wait()` and the completion of the next. A monotonic clock is used so
//! wall-clock adjustments cannot shorten the gap.

use std::time::{Duration, Instant};

/// Enforces a floor on the time between consecutive requests
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_release: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_release: None,
        }
    }

    /// Suspends until the minimum interval has elapsed since the previous
    /// `wait()` returned. The first call returns immediately.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_release {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        self.last_release = Some(Instant::now());
    }
}
