use async_trait::async_trait;

/// Port for observing in-flight user interactions and animations
///
/// Deferred work waits on this before it runs so that expensive tasks never
/// compete with a gesture or transition that is still in progress.
///
/// # Examples
///
/// ```no_run
/// use pacer::domain::ports::InteractionTracker;
///
/// async fn example(tracker: &dyn InteractionTracker) {
///     tracker.settled().await;
///     // Nothing is animating now
/// }
/// ```
#[async_trait]
pub trait InteractionTracker: Send + Sync {
    /// Resolve once no interaction is in flight
    ///
    /// Resolves immediately when the tracker is already idle.
    async fn settled(&self);

    /// Number of interactions currently in flight
    fn in_flight(&self) -> usize;
}
