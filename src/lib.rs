//! Pacer - timing and scheduling helpers for async Rust
//!
//! Pacer collects the small utilities an event-driven program reaches for when
//! handlers fire faster than work should run:
//!
//! - [`debounce`]: collapse a burst of calls into one trailing invocation
//! - [`throttle`]: run at most once per cooldown window, dropping the rest
//! - [`MemoCell`]: cache a derived value until its dependencies change by
//!   structural comparison
//! - [`NonBlockingOperation`]: move synchronous work onto a later runtime turn
//! - [`run_after_interactions`]: defer work until interactions settle and the
//!   next frame begins
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): snapshots, configuration, errors and ports
//! - **Service Layer** (`services`): the timing helpers
//! - **Infrastructure Layer** (`infrastructure`): config loading, logging and
//!   host scheduling adapters
//! - **CLI Layer** (`cli`): the `pacer` demo binary
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pacer::debounce;
//!
//! #[tokio::main]
//! async fn main() {
//!     let save = debounce(|text: String| println!("saving {text}"), Duration::from_millis(300));
//!     save.call("h".to_string());
//!     save.call("hello".to_string());
//!     tokio::time::sleep(Duration::from_millis(400)).await;
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{deep_equal, Config, DispatchMode, LoggingConfig, Snapshot, TimingConfig};
pub use domain::ports::{FrameClock, InteractionTracker};
pub use domain::{TimingError, TimingResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::scheduling::{InteractionGate, IntervalFrameClock};
pub use services::{
    debounce, run_after_interactions, throttle, DeferredScheduler, DeferredTask, Debouncer, MemoCell,
    NonBlockingOperation, Throttler,
};
