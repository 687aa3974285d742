//! Non-blocking operation runner.
//!
//! Moves a synchronous operation off the caller's current turn: `run` returns
//! immediately and the operation executes on a later turn of the runtime.
//! This only yields scheduling priority. On a current-thread runtime the
//! operation still runs on the same thread; nothing here adds parallelism,
//! retries or timeouts.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::domain::models::{DispatchMode, Snapshot};

use super::deferred_task::DeferredTask;
use super::memo::MemoCell;

/// A reusable handle to a synchronous operation that runs deferred.
///
/// Clones share the same operation; [`same_operation`](Self::same_operation)
/// tells whether two handles were created from one `new` call.
pub struct NonBlockingOperation<T> {
    operation: Arc<dyn Fn() -> T + Send + Sync>,
    mode: DispatchMode,
}

impl<T> Clone for NonBlockingOperation<T> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            mode: self.mode,
        }
    }
}

impl<T> std::fmt::Debug for NonBlockingOperation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonBlockingOperation")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> NonBlockingOperation<T> {
    /// Wrap `operation`, dispatching in [`DispatchMode::Yield`].
    pub fn new<F>(operation: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            operation: Arc::new(operation),
            mode: DispatchMode::default(),
        }
    }

    /// Choose how the operation is dispatched.
    #[must_use]
    pub const fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Return the operation cached in `cell` while `deps` stays deep-equal
    /// to the snapshot it was bound with, or bind a new one.
    pub fn bind<F>(cell: &mut MemoCell<Self>, deps: impl Into<Snapshot>, operation: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        cell.compute(deps, || Self::new(operation)).clone()
    }

    /// Schedule the operation on a later turn and return its pending result.
    ///
    /// Must be called from within a tokio runtime. The operation never runs
    /// inside this call. On a current-thread runtime the returned task is
    /// also still pending at its first poll; on a multi-thread runtime
    /// another worker may finish it before the caller polls.
    pub fn run(&self) -> DeferredTask<T> {
        let id = Uuid::new_v4();
        let operation = Arc::clone(&self.operation);
        let span = tracing::debug_span!("non_blocking_operation", task_id = %id, mode = ?self.mode);

        let handle = match self.mode {
            DispatchMode::Yield => tokio::spawn(
                async move {
                    tokio::task::yield_now().await;
                    tracing::trace!("running deferred operation");
                    operation()
                }
                .instrument(span),
            ),
            DispatchMode::Blocking => tokio::task::spawn_blocking(move || {
                let _entered = span.enter();
                tracing::trace!("running deferred operation on blocking pool");
                operation()
            }),
        };

        DeferredTask::new(id, handle)
    }

    /// Dispatch mode in use.
    pub const fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Whether both handles wrap the same operation.
    pub fn same_operation(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.operation, &other.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TimingError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[tokio::test]
    async fn test_resolves_to_operation_result() {
        let op = NonBlockingOperation::new(|| 42);
        assert_eq!(op.run().await, Ok(42));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_never_resolves_synchronously() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let op = NonBlockingOperation::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            42
        });

        let mut pending = task::spawn(op.run());
        assert_pending!(pending.poll());
        assert_eq!(ran.load(Ordering::SeqCst), 0, "operation ran on the caller's turn");

        // Let the runtime take the turns the operation is waiting for
        while !pending.is_woken() {
            tokio::task::yield_now().await;
        }
        assert_ready_eq!(pending.poll(), Ok(42));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_becomes_error() {
        let op = NonBlockingOperation::new(|| -> u32 { panic!("list too long") });
        assert_eq!(
            op.run().await,
            Err(TimingError::OperationPanicked("list too long".to_string()))
        );
    }

    #[tokio::test]
    async fn test_abort_before_start_cancels() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let op = NonBlockingOperation::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let deferred = op.run();
        deferred.abort();
        assert_eq!(deferred.await, Err(TimingError::Cancelled));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_each_run_is_a_new_task() {
        let op = NonBlockingOperation::new(|| "done");
        let first = op.run();
        let second = op.run();
        assert_ne!(first.id(), second.id());
        assert_eq!(first.await, Ok("done"));
        assert_eq!(second.await, Ok("done"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_mode() {
        let op = NonBlockingOperation::new(|| (1..=100u64).sum::<u64>()).with_mode(DispatchMode::Blocking);
        assert_eq!(op.mode(), DispatchMode::Blocking);
        assert_eq!(op.run().await, Ok(5050));
    }

    #[test]
    fn test_bind_reuses_operation_until_deps_change() {
        let mut cell = MemoCell::new();

        let first = NonBlockingOperation::bind(&mut cell, vec!["open"], || 1);
        let again = NonBlockingOperation::bind(&mut cell, vec!["open"], || 2);
        assert!(first.same_operation(&again));

        let changed = NonBlockingOperation::bind(&mut cell, vec!["done"], || 3);
        assert!(!first.same_operation(&changed));
    }

    #[test]
    fn test_bind_with_empty_deps_is_stable() {
        let mut cell = MemoCell::new();
        let first = NonBlockingOperation::bind(&mut cell, Snapshot::List(vec![]), || ());
        let again = NonBlockingOperation::bind(&mut cell, Snapshot::List(vec![]), || ());
        assert!(first.same_operation(&again));
    }
}
