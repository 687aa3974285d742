//! Deferred-interaction scheduling.
//!
//! Runs a task only once in-flight interactions have settled, then defers it
//! again to the next frame boundary so it lands between paints.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::domain::ports::{FrameClock, InteractionTracker};

use super::deferred_task::DeferredTask;

/// Composes an [`InteractionTracker`] and a [`FrameClock`] into one
/// "run after interactions" primitive. Holds no state beyond the two ports.
#[derive(Clone)]
pub struct DeferredScheduler {
    tracker: Arc<dyn InteractionTracker>,
    clock: Arc<dyn FrameClock>,
}

impl DeferredScheduler {
    /// Build a scheduler over the given host primitives.
    pub fn new(tracker: Arc<dyn InteractionTracker>, clock: Arc<dyn FrameClock>) -> Self {
        Self { tracker, clock }
    }

    /// Run `task` after interactions settle, on the following frame.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_after_interactions<T, F>(&self, task: F) -> DeferredTask<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        run_after_interactions(Arc::clone(&self.tracker), Arc::clone(&self.clock), task)
    }
}

impl std::fmt::Debug for DeferredScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredScheduler")
            .field("in_flight", &self.tracker.in_flight())
            .finish_non_exhaustive()
    }
}

/// Run `task` once `tracker` reports no interactions in flight, deferred to
/// the next boundary of `clock`.
pub fn run_after_interactions<T, F>(
    tracker: Arc<dyn InteractionTracker>,
    clock: Arc<dyn FrameClock>,
    task: F,
) -> DeferredTask<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let id = Uuid::new_v4();
    let span = tracing::debug_span!("run_after_interactions", task_id = %id);

    let handle = tokio::spawn(
        async move {
            tracing::trace!(in_flight = tracker.in_flight(), "waiting for interactions to settle");
            tracker.settled().await;
            clock.next_frame().await;
            tracing::debug!("running deferred interaction task");
            task()
        }
        .instrument(span),
    );

    DeferredTask::new(id, handle)
}
