//! Wall-clock and sleep abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of wall-clock time and of delays.
///
/// Everything that timestamps or waits goes through a clock so tests can
/// simulate the passage of time.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// The real clock: `chrono::Utc` and `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Elapsed time between two instants, clamped at zero when the wall clock
/// stepped backwards.
pub fn elapsed_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
    (end - start).to_std().unwrap_or_default()
}
