//! Trailing-edge debounce.
//!
//! A [`Debouncer`] delays its wrapped function until calls stop arriving for
//! a quiet period. Every call supersedes the pending one, so only the last
//! call inside any window actually runs, with that call's arguments.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::domain::models::TimingConfig;

/// Quiet period used by [`debounce_default`].
pub const DEFAULT_DEBOUNCE_WAIT: Duration = Duration::from_millis(300);

/// Wrap `func` so it runs `wait` after the last of a burst of calls.
///
/// Must be called from within a tokio runtime when the wrapper is invoked,
/// since each call schedules a timer task.
pub fn debounce<A, F>(func: F, wait: Duration) -> Debouncer<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debouncer::new(func, wait)
}

/// [`debounce`] with the 300ms default quiet period.
pub fn debounce_default<A, F>(func: F) -> Debouncer<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debouncer::new(func, DEFAULT_DEBOUNCE_WAIT)
}

/// Pending timer plus the arguments it will run with.
struct DebounceState<A> {
    /// Bumped on every call, cancel and flush; a timer only fires if its
    /// generation is still current when it wakes.
    generation: u64,
    pending: Option<JoinHandle<()>>,
    latest: Option<A>,
}

struct DebounceInner<A> {
    func: Box<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    state: Mutex<DebounceState<A>>,
    invocations: AtomicU64,
}

impl<A> DebounceInner<A> {
    fn fire(&self, generation: u64) {
        let args = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state.pending = None;
            state.latest.take()
        };

        if let Some(args) = args {
            self.invoke(args);
        }
    }

    fn invoke(&self, args: A) {
        let count = self.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(invocation = count, "debounced function firing");
        (self.func)(args);
    }

    /// Drop the pending timer and its arguments. Caller holds the lock.
    fn supersede(state: &mut DebounceState<A>) -> Option<A> {
        state.generation = state.generation.wrapping_add(1);
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }
        state.latest.take()
    }
}

impl<A> Drop for DebounceInner<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().pending.take() {
            handle.abort();
        }
    }
}

/// Debounced wrapper around a function of `A`.
///
/// Clones share one pending timer. Dropping the last clone aborts the timer
/// without running the function.
pub struct Debouncer<A> {
    inner: Arc<DebounceInner<A>>,
}

impl<A> Clone for Debouncer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.inner.wait)
            .field("pending", &self.is_pending())
            .field("invocations", &self.invocations())
            .finish()
    }
}

impl<A: Send + 'static> Debouncer<A> {
    /// Create a debounced wrapper with the given quiet period.
    pub fn new<F>(func: F, wait: Duration) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(DebounceInner {
                func: Box::new(func),
                wait,
                state: Mutex::new(DebounceState {
                    generation: 0,
                    pending: None,
                    latest: None,
                }),
                invocations: AtomicU64::new(0),
            }),
        }
    }

    /// Create a debounced wrapper using the configured quiet period.
    pub fn from_config<F>(func: F, config: &TimingConfig) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::new(func, config.debounce_wait())
    }

    /// Record `args` and (re)start the quiet period.
    ///
    /// Any previously scheduled invocation is cancelled. A quiet period too
    /// long to express as an instant never elapses; the call then only runs
    /// through [`flush`](Self::flush).
    pub fn call(&self, args: A) {
        let deadline = Instant::now().checked_add(self.inner.wait);
        let weak: Weak<DebounceInner<A>> = Arc::downgrade(&self.inner);

        let mut state = self.inner.state.lock();
        let superseded = DebounceInner::supersede(&mut state).is_some();
        let generation = state.generation;
        state.latest = Some(args);
        state.pending = Some(tokio::spawn(async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
            if let Some(inner) = weak.upgrade() {
                inner.fire(generation);
            }
        }));
        drop(state);

        tracing::trace!(superseded, wait = ?self.inner.wait, "debounce scheduled");
    }

    /// Cancel the pending invocation. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let dropped = DebounceInner::supersede(&mut self.inner.state.lock());
        if dropped.is_some() {
            tracing::debug!("pending debounced call cancelled");
        }
        dropped.is_some()
    }

    /// Run the pending invocation now instead of waiting out the quiet
    /// period. Returns whether anything ran.
    pub fn flush(&self) -> bool {
        let args = DebounceInner::supersede(&mut self.inner.state.lock());
        match args {
            Some(args) => {
                self.inner.invoke(args);
                true
            }
            None => false,
        }
    }
}

impl<A> Debouncer<A> {
    /// Whether an invocation is scheduled.
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().latest.is_some()
    }

    /// Number of times the wrapped function has run.
    pub fn invocations(&self) -> u64 {
        self.inner.invocations.load(Ordering::Relaxed)
    }

    /// Configured quiet period.
    pub fn wait(&self) -> Duration {
        self.inner.wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn recording() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value| sink.lock().push(value))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_with_last_arguments() {
        let (seen, func) = recording();
        let debounced = debounce(func, Duration::from_millis(300));

        for value in 1..=5 {
            debounced.call(value);
            sleep(Duration::from_millis(100)).await;
        }
        assert!(seen.lock().is_empty(), "nothing runs while calls keep arriving");

        sleep(Duration::from_millis(400)).await;

        assert_eq!(*seen.lock(), vec![5]);
        assert_eq!(debounced.invocations(), 1);
        assert!(!debounced.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_separated_by_quiet_period_both_run() {
        let (seen, func) = recording();
        let debounced = debounce(func, Duration::from_millis(300));

        debounced.call(1);
        sleep(Duration::from_millis(350)).await;
        debounced.call(2);
        sleep(Duration::from_millis(350)).await;

        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_fire_before_wait() {
        let (seen, func) = recording();
        let debounced = debounce_default(func);

        debounced.call(7);
        sleep(Duration::from_millis(299)).await;
        assert!(seen.lock().is_empty());
        assert!(debounced.is_pending());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(*seen.lock(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let (seen, func) = recording();
        let debounced = debounce(func, Duration::from_millis(100));

        debounced.call(1);
        assert!(debounced.cancel());
        assert!(!debounced.cancel());

        sleep(Duration::from_millis(200)).await;
        assert!(seen.lock().is_empty());
        assert_eq!(debounced.invocations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_runs_immediately_and_clears_timer() {
        let (seen, func) = recording();
        let debounced = debounce(func, Duration::from_millis(100));

        debounced.call(3);
        assert!(debounced.flush());
        assert_eq!(*seen.lock(), vec![3]);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock(), vec![3], "flushed call must not fire again");
        assert!(!debounced.flush());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_pending_call() {
        let (seen, func) = recording();
        let debounced = debounce(func, Duration::from_millis(100));
        let other = debounced.clone();

        debounced.call(1);
        other.call(2);
        sleep(Duration::from_millis(150)).await;

        assert_eq!(*seen.lock(), vec![2]);
        assert_eq!(debounced.invocations(), other.invocations());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_wrapper_aborts_timer() {
        let (seen, func) = recording();
        let debounced = debounce(func, Duration::from_millis(100));

        debounced.call(1);
        drop(debounced);
        sleep(Duration::from_millis(200)).await;

        assert!(seen.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_wait_never_fires() {
        let (seen, func) = recording();
        let debounced = debounce(func, Duration::MAX);

        debounced.call(1);
        debounced.call(2);
        sleep(Duration::from_secs(365 * 24 * 3600)).await;
        assert!(seen.lock().is_empty());
        assert!(debounced.is_pending());

        assert!(debounced.flush());
        assert_eq!(*seen.lock(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_uses_configured_wait() {
        let config = TimingConfig {
            debounce_wait_ms: 50,
            ..TimingConfig::default()
        };
        let (seen, func) = recording();
        let debounced = Debouncer::from_config(func, &config);
        assert_eq!(debounced.wait(), Duration::from_millis(50));

        debounced.call(9);
        sleep(Duration::from_millis(60)).await;
        assert_eq!(*seen.lock(), vec![9]);
    }
}
