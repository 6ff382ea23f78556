//! Optional client-side request pacing
//!
//! Off unless `max_requests_per_second` is configured. When on, every request
//! waits for a permit before it leaves, which keeps bulk commands under the
//! vendor's throttle instead of relying on 429 backoff alone.

use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;

/// Direct (un-keyed) rate limiter shared by every request of one transport.
pub struct RequestPacer {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    per_second: Option<NonZeroU32>,
}

impl RequestPacer {
    /// Create a pacer; `None` or `Some(0)` disables pacing.
    pub fn new(per_second: Option<u32>) -> Self {
        let per_second = per_second.and_then(NonZeroU32::new);
        Self {
            limiter: per_second.map(|rate| RateLimiter::direct(Quota::per_second(rate))),
            per_second,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    pub fn rate(&self) -> Option<u32> {
        self.per_second.map(NonZeroU32::get)
    }

    /// Wait for a permit if pacing is on.
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                debug!("Pacing request at {:?}/s", self.rate());
                limiter.until_ready().await;
            }
        }
    }
}
