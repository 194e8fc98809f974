//! Proactive request pacing.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// GitHub core API allows 5000 requests/hour (~1.4/sec); 10/sec leaves room
/// for bursts while the hourly budget is tracked server-side.
pub const GITHUB_DEFAULT_RPS: u32 = 10;

/// A standalone request pacer backed by the governor crate.
///
/// When attached to the client, `wait()` is awaited before every request so
/// the crawler stays under the remote budget instead of bouncing off 403s.
///
/// # Example
///
/// ```ignore
/// use prospector::rate_limit::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(10); // 10 requests per second
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a limiter allowing `requests_per_second` (clamped to ≥ 1).
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rps));

        Self {
            inner: Arc::new(rate_limiter),
        }
    }

    /// Wait until the limiter allows another request.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn limiter_allows_first_request_immediately() {
        let limiter = ApiRateLimiter::new(100);
        limiter.wait().await;
    }

    #[tokio::test]
    async fn zero_rps_is_clamped_to_one() {
        // Must not panic on construction.
        let limiter = ApiRateLimiter::new(0);
        limiter.wait().await;
    }

    #[test]
    fn limiter_is_shared_across_clones() {
        let limiter = ApiRateLimiter::new(5);
        let clone = limiter.clone();
        assert!(Arc::ptr_eq(&limiter.inner, &clone.inner));
    }
}
