//! Rate limiter for the MFL export API.
//!
//! MFL blocks clients that hammer the export endpoint, so every request waits
//! for a slot from a single bucket.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = GovLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

#[derive(Debug, Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// A zero rate is treated as one request per second.
    pub fn per_second(requests: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a request slot is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to take a slot without waiting.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_bounded_by_quota() {
        let limiter = RateLimiter::per_second(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_zero_rate_still_admits_one() {
        let limiter = RateLimiter::per_second(0);
        assert!(limiter.try_acquire());
    }
}
