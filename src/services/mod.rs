//! Timing helpers: rate limiting, memoization and deferred work.

pub mod debounce;
pub mod deferred_task;
pub mod interactions;
pub mod memo;
pub mod non_blocking;
pub mod throttle;

pub use debounce::{debounce, debounce_default, Debouncer, DEFAULT_DEBOUNCE_WAIT};
pub use deferred_task::DeferredTask;
pub use interactions::{run_after_interactions, DeferredScheduler};
pub use memo::MemoCell;
pub use non_blocking::NonBlockingOperation;
pub use throttle::{throttle, throttle_default, Throttler, DEFAULT_THROTTLE_LIMIT};
