//! Retry backoff policy
//!
//! A pure delay schedule, kept separate from the fetcher so the curve can be
//! tested without any network machinery.

use std::time::Duration;

/// Maximum number of attempts per fetch, including the first
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Ceiling on any single backoff delay
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Returns the delay to sleep before retry number `attempt` (0-based).
///
/// The schedule doubles from [`BASE_DELAY`] and is capped at [`MAX_DELAY`]:
/// 1s, 2s, 4s, ...
pub fn next_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    BASE_DELAY.saturating_mul(factor).min(MAX_DELAY)
}
