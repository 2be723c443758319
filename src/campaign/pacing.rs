//! Inter-transaction delay policy.

use rand::Rng;
use std::time::Duration;

/// Delay after each fast-endpoint dispatch in asynchronous mode.
pub const FAST_ASYNC_PACING: PacingPolicy = PacingPolicy::between_millis(600, 1200);

/// Delay after each fast-endpoint dispatch in synchronous mode.
pub const FAST_SYNC_PACING: PacingPolicy = PacingPolicy::between_millis(200, 400);

/// Delay after each standard-endpoint dispatch, roughly one block.
pub const STANDARD_PACING: PacingPolicy = PacingPolicy::between_millis(4000, 5000);

/// Pause between two consecutive campaigns.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// A uniformly random delay in `[min, min + jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    min: Duration,
    jitter: Duration,
}

impl PacingPolicy {
    /// Delays drawn from `[min, max)` at microsecond granularity. A `max` below
    /// `min` yields a fixed delay.
    pub fn between(min: Duration, max: Duration) -> Self {
        Self {
            min,
            jitter: max.saturating_sub(min),
        }
    }

    pub const fn between_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms),
            jitter: Duration::from_millis(max_ms.saturating_sub(min_ms)),
        }
    }

    pub const fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            jitter: Duration::ZERO,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    /// Exclusive upper bound of the drawn delays.
    pub fn max(&self) -> Duration {
        self.min + self.jitter
    }

    /// Draw the next delay.
    pub fn next_delay(&self) -> Duration {
        let jitter_us = self.jitter.as_micros() as u64;
        if jitter_us == 0 {
            return self.min;
        }
        self.min + Duration::from_micros(rand::rng().random_range(0..jitter_us))
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        FAST_ASYNC_PACING
    }
}
