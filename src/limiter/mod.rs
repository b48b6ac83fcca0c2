//! Sliding-window rate limiter keyed by caller identity.
//!
//! Each caller owns an ordered record of admission timestamps within the
//! trailing window. A check prunes stale timestamps, then either rejects
//! (without recording) or records the new admission. Prune-then-append is
//! atomic per check: the whole sequence runs under one write lock.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

pub struct RateLimiter {
    window: Duration,
    limit: usize,
    windows: RwLock<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, limit: usize) -> Self {
        Self {
            window,
            limit,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Admit or reject a request attempt for `identity` at the current time.
    pub async fn admit(&self, identity: &str) -> bool {
        self.admit_at(identity, Instant::now()).await
    }

    /// Admit or reject at an explicit timestamp. Timestamps are expected to
    /// be monotonically non-decreasing per identity.
    pub async fn admit_at(&self, identity: &str, now: Instant) -> bool {
        let mut windows = self.windows.write().await;
        let record = windows.entry(identity.to_string()).or_default();

        // Drop timestamps that have aged out of the trailing window.
        while record
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            record.pop_front();
        }

        if record.len() >= self.limit {
            debug!(identity, in_window = record.len(), "rate limit exceeded");
            return false;
        }

        record.push_back(now);
        true
    }
}
