pub mod config;
pub mod snapshot;

pub use config::{Config, DispatchMode, LoggingConfig, TimingConfig};
pub use snapshot::{deep_equal, deep_equal_bounded, Snapshot, DEFAULT_MAX_DEPTH};
