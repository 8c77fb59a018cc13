//! Reconnect backoff
//!
//! Capped linear backoff: the n-th consecutive retry waits `min(cap, step * n)`.
//! The retry counter is plain state on `Backoff` so it can be driven and
//! inspected without a socket.

use std::time::Duration;

/// Step and cap of the reconnect delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub step: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(500),
            cap: Duration::from_millis(5000),
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.cap)
    }
}

/// Retry counter plus policy
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    retries: u32,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, retries: 0 }
    }

    /// Consecutive retries since the last successful open
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Count one more disconnect and return how long to wait
    pub fn next_delay(&mut self) -> Duration {
        self.retries = self.retries.saturating_add(1);
        self.policy.delay_for(self.retries)
    }

    /// Called on a successful open
    pub fn reset(&mut self) {
        self.retries = 0;
    }
}
