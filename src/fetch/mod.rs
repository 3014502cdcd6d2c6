//! Fetch module: rate limiting, retry policy, and the HTTP fetcher
//!
//! Everything the harvester reads off the network passes through here.
//! The layering is deliberate: a pure backoff schedule, a rate limiter that
//! knows nothing about HTTP, and a fetcher composing both around reqwest.

mod backoff;
mod fetcher;
mod limiter;

pub use backoff::{next_delay, MAX_ATTEMPTS};
pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use limiter::RateLimiter;
