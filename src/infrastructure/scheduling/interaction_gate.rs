//! Counter of in-flight interactions backing [`InteractionTracker`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::ports::InteractionTracker;

/// Tracks gestures and animations that deferred work should not interrupt.
///
/// Call [`begin`](Self::begin) when an interaction starts; the interaction
/// ends when the returned handle is dropped. Clones share one counter.
#[derive(Debug, Clone)]
pub struct InteractionGate {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Default for InteractionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionGate {
    /// Create an idle gate.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            in_flight: Arc::new(sender),
        }
    }

    /// Mark an interaction as started.
    #[must_use = "the interaction ends as soon as the handle is dropped"]
    pub fn begin(&self) -> InteractionHandle {
        self.in_flight.send_modify(|count| *count += 1);
        tracing::trace!(in_flight = *self.in_flight.borrow(), "interaction started");
        InteractionHandle {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

#[async_trait]
impl InteractionTracker for InteractionGate {
    async fn settled(&self) {
        let mut receiver = self.in_flight.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = receiver.wait_for(|count| *count == 0).await;
    }

    fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }
}

/// Live interaction; ends the interaction when dropped.
#[derive(Debug)]
pub struct InteractionHandle {
    in_flight: Arc<watch::Sender<usize>>,
}

impl InteractionHandle {
    /// End the interaction explicitly.
    pub fn end(self) {}
}

impl Drop for InteractionHandle {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
        tracing::trace!(in_flight = *self.in_flight.borrow(), "interaction ended");
    }
}
