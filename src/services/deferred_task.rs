//! Handle to a unit of deferred work and its eventual result.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::errors::{TimingError, TimingResult};

/// A spawned unit of deferred work.
///
/// Awaiting it yields the work's result, `TimingError::OperationPanicked` if
/// the work panicked, or `TimingError::Cancelled` after [`abort`](Self::abort).
/// Dropping the handle does not cancel the work.
#[derive(Debug)]
pub struct DeferredTask<T> {
    id: Uuid,
    handle: JoinHandle<T>,
}

impl<T> DeferredTask<T> {
    pub(crate) const fn new(id: Uuid, handle: JoinHandle<T>) -> Self {
        Self { id, handle }
    }

    /// Identifier recorded on the task's tracing span.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel the work if it has not started running yet.
    pub fn abort(&self) {
        tracing::debug!(task_id = %self.id, "deferred task aborted");
        self.handle.abort();
    }

    /// Whether the work has finished (including by panic or cancellation).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for DeferredTask<T> {
    type Output = TimingResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.handle.poll_unpin(cx).map(|joined| {
            joined.map_err(|err| {
                let err = TimingError::from(err);
                tracing::warn!(error = %err, "deferred task did not complete");
                err
            })
        })
    }
}
