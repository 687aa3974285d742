//! Leading-edge throttle.
//!
//! The first call runs immediately and opens a cooldown window; calls inside
//! the window are dropped (no trailing call is replayed once it closes).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::domain::models::TimingConfig;

/// Cooldown used by [`throttle_default`].
pub const DEFAULT_THROTTLE_LIMIT: Duration = Duration::from_millis(300);

/// Wrap `func` so it runs at most once per `limit`.
pub fn throttle<A, R, F>(func: F, limit: Duration) -> Throttler<A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
{
    Throttler::new(func, limit)
}

/// [`throttle`] with the 300ms default cooldown.
pub fn throttle_default<A, R, F>(func: F) -> Throttler<A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
{
    Throttler::new(func, DEFAULT_THROTTLE_LIMIT)
}

/// Cooldown window state.
#[derive(Debug, Default, Clone, Copy)]
enum Cooldown {
    #[default]
    Open,
    Until(Instant),
    /// The limit overflows `Instant`; only `reset` reopens the window.
    UntilReset,
}

#[derive(Debug, Default)]
struct ThrottleState {
    cooldown: Cooldown,
}

impl ThrottleState {
    fn cooling_down(&self, now: Instant) -> bool {
        match self.cooldown {
            Cooldown::Open => false,
            Cooldown::Until(until) => now < until,
            Cooldown::UntilReset => true,
        }
    }
}

struct ThrottleInner<A, R> {
    func: Box<dyn Fn(A) -> R + Send + Sync>,
    limit: Duration,
    state: Mutex<ThrottleState>,
    invocations: AtomicU64,
    dropped: AtomicU64,
}

/// Throttled wrapper around a function of `A` returning `R`.
///
/// The wrapped function runs on the caller's stack, so a panic inside it
/// reaches the caller. The cooldown is already open by then.
pub struct Throttler<A, R = ()> {
    inner: Arc<ThrottleInner<A, R>>,
}

impl<A, R> Clone for Throttler<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> std::fmt::Debug for Throttler<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttler")
            .field("limit", &self.inner.limit)
            .field("invocations", &self.invocations())
            .field("dropped", &self.dropped())
            .finish()
    }
}

impl<A, R> Throttler<A, R> {
    /// Create a throttled wrapper with the given cooldown.
    pub fn new<F>(func: F, limit: Duration) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ThrottleInner {
                func: Box::new(func),
                limit,
                state: Mutex::new(ThrottleState::default()),
                invocations: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Create a throttled wrapper using the configured cooldown.
    pub fn from_config<F>(func: F, config: &TimingConfig) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::new(func, config.throttle_limit())
    }

    /// Run the wrapped function unless a cooldown is open.
    ///
    /// Returns the function's result when it ran, `None` when the call was
    /// dropped.
    pub fn call(&self, args: A) -> Option<R> {
        let now = Instant::now();
        {
            let mut state = self.inner.state.lock();
            if state.cooling_down(now) {
                drop(state);
                let dropped = self.inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(dropped, "throttled call dropped");
                return None;
            }
            state.cooldown = now
                .checked_add(self.inner.limit)
                .map_or(Cooldown::UntilReset, Cooldown::Until);
        }

        let count = self.inner.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(invocation = count, limit = ?self.inner.limit, "throttled function running");
        Some((self.inner.func)(args))
    }

    /// Whether calls are currently being dropped.
    pub fn is_cooling_down(&self) -> bool {
        self.inner.state.lock().cooling_down(Instant::now())
    }

    /// Close the cooldown window early so the next call runs.
    pub fn reset(&self) {
        self.inner.state.lock().cooldown = Cooldown::Open;
    }

    /// Number of times the wrapped function has run.
    pub fn invocations(&self) -> u64 {
        self.inner.invocations.load(Ordering::Relaxed)
    }

    /// Number of calls dropped during cooldowns.
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Configured cooldown.
    pub fn limit(&self) -> Duration {
        self.inner.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_only_first_call() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let throttled = throttle(move |v: u32| sink.lock().push(v), Duration::from_millis(300));

        for value in 1..=5 {
            throttled.call(value);
            sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(throttled.invocations(), 1);
        assert_eq!(throttled.dropped(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_after_limit_runs_again() {
        let throttled = throttle(|v: u32| v * 10, Duration::from_millis(300));

        assert_eq!(throttled.call(1), Some(10));
        assert_eq!(throttled.call(2), None);
        assert!(throttled.is_cooling_down());

        sleep(Duration::from_millis(300)).await;
        assert!(!throttled.is_cooling_down());
        assert_eq!(throttled.call(3), Some(30));
        assert_eq!(throttled.invocations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_call_is_not_replayed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let throttled = throttle_default(move |v: u32| sink.lock().push(v));

        throttled.call(1);
        throttled.call(2);
        sleep(Duration::from_secs(1)).await;

        assert_eq!(*seen.lock(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_reopens_immediately() {
        let throttled = throttle(|()| (), Duration::from_secs(10));
        assert!(throttled.call(()).is_some());
        assert!(throttled.call(()).is_none());

        throttled.reset();
        assert!(throttled.call(()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_limit_closes_until_reset() {
        let throttled = throttle(|()| 1, Duration::MAX);
        assert_eq!(throttled.call(()), Some(1));

        sleep(Duration::from_secs(365 * 24 * 3600)).await;
        assert!(throttled.is_cooling_down());
        assert_eq!(throttled.call(()), None);

        throttled.reset();
        assert_eq!(throttled.call(()), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_cooldown() {
        let throttled = throttle(|()| (), Duration::from_millis(100));
        let other = throttled.clone();

        assert!(throttled.call(()).is_some());
        assert!(other.call(()).is_none());
        assert_eq!(other.invocations(), 1);
    }

    #[test]
    fn test_works_without_runtime() {
        let throttled: Throttler<(), ()> = Throttler::from_config(|()| (), &TimingConfig::default());
        assert_eq!(throttled.limit(), Duration::from_millis(300));
        assert!(throttled.call(()).is_some());
        assert!(throttled.is_cooling_down());
    }
}
