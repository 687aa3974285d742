use async_trait::async_trait;

/// Port for the host's paint-frame cadence
#[async_trait]
pub trait FrameClock: Send + Sync {
    /// Resolve at the next frame boundary
    ///
    /// Always waits for a boundary strictly in the future, even when called
    /// exactly on one.
    async fn next_frame(&self);
}
