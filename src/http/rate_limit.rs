//! Client-side request pacing
//!
//! A governor token bucket sits in front of every Turso API call. Clones
//! share one bucket, so a run is paced as a whole rather than per stream.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    pub requests_per_second: u32,
    /// Requests allowed back to back before pacing starts
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl RateLimiterConfig {
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

type Bucket = Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Bucket>,
}

impl RateLimiter {
    /// Zero rate or burst is clamped to one
    pub fn new(config: &RateLimiterConfig) -> Self {
        let at_least_one = |n| NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(at_least_one(config.requests_per_second))
            .allow_burst(at_least_one(config.burst_size));

        Self {
            bucket: Arc::new(Governor::direct(quota)),
        }
    }

    /// Resolves once the bucket has a token for the next request
    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }

    /// Takes a token if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
