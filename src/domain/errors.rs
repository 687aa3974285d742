//! Domain errors for the pacer timing helpers.

use thiserror::Error;

/// Errors surfaced by the timing helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimingError {
    #[error("Deferred operation panicked: {0}")]
    OperationPanicked(String),

    #[error("Deferred operation was cancelled before it completed")]
    Cancelled,

    #[error("Snapshot comparison exceeded maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Invalid timing window: {0}")]
    InvalidWindow(String),
}

pub type TimingResult<T> = Result<T, TimingError>;

impl From<tokio::task::JoinError> for TimingError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            return TimingError::Cancelled;
        }
        match err.try_into_panic() {
            Ok(payload) => TimingError::OperationPanicked(panic_message(payload.as_ref())),
            Err(err) => TimingError::OperationPanicked(err.to_string()),
        }
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_error_panic_maps_to_operation_panicked() {
        let handle = tokio::spawn(async { panic!("boom") });
        let err: TimingError = handle.await.unwrap_err().into();
        assert_eq!(err, TimingError::OperationPanicked("boom".to_string()));
    }

    #[tokio::test]
    async fn test_join_error_abort_maps_to_cancelled() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });
        handle.abort();
        let err: TimingError = handle.await.unwrap_err().into();
        assert_eq!(err, TimingError::Cancelled);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TimingError::DepthExceeded { limit: 8 }.to_string(),
            "Snapshot comparison exceeded maximum depth of 8"
        );
    }
}
