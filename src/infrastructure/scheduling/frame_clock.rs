//! Fixed-cadence frame clock backing [`FrameClock`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep_until, Instant};

use crate::domain::errors::{TimingError, TimingResult};
use crate::domain::models::TimingConfig;
use crate::domain::ports::FrameClock;

/// Frame boundaries every `interval`, counted from the clock's origin.
#[derive(Debug, Clone)]
pub struct IntervalFrameClock {
    origin: Instant,
    interval: Duration,
}

impl IntervalFrameClock {
    /// Create a clock whose first boundary is one `interval` from now.
    pub fn new(interval: Duration) -> TimingResult<Self> {
        Self::with_origin(Instant::now(), interval)
    }

    /// Create a clock aligned to `origin`.
    pub fn with_origin(origin: Instant, interval: Duration) -> TimingResult<Self> {
        if interval.is_zero() {
            return Err(TimingError::InvalidWindow(
                "frame interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self { origin, interval })
    }

    /// Create a clock using the configured frame interval.
    pub fn from_config(config: &TimingConfig) -> TimingResult<Self> {
        Self::new(config.frame_interval())
    }

    /// First boundary strictly after `now`.
    pub fn next_boundary(&self, now: Instant) -> Instant {
        let elapsed = now.saturating_duration_since(self.origin).as_nanos();
        let interval = self.interval.as_nanos();
        let frames = elapsed / interval + 1;
        let offset = u64::try_from(frames * interval).unwrap_or(u64::MAX);
        self.origin + Duration::from_nanos(offset)
    }

    /// Configured frame interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl FrameClock for IntervalFrameClock {
    async fn next_frame(&self) {
        sleep_until(self.next_boundary(Instant::now())).await;
    }
}
