use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration structure for Pacer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Timing helper defaults
    #[serde(default)]
    pub timing: TimingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How a non-blocking operation is dispatched onto the runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Spawn a task that yields once before running the operation
    #[default]
    Yield,
    /// Run the operation on the blocking thread pool
    Blocking,
}

/// Timing helper defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimingConfig {
    /// Quiet period for debounced wrappers
    #[serde(default = "default_window_ms")]
    pub debounce_wait_ms: u64,

    /// Cooldown window for throttled wrappers
    #[serde(default = "default_window_ms")]
    pub throttle_limit_ms: u64,

    /// Frame interval for deferred interaction work (16ms ~ 60fps)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Maximum container nesting walked when comparing dependency snapshots
    #[serde(default = "default_max_compare_depth")]
    pub max_compare_depth: usize,

    /// Dispatch mode for non-blocking operations
    #[serde(default)]
    pub dispatch: DispatchMode,
}

const fn default_window_ms() -> u64 {
    300
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_max_compare_depth() -> usize {
    crate::domain::models::snapshot::DEFAULT_MAX_DEPTH
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_wait_ms: default_window_ms(),
            throttle_limit_ms: default_window_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            max_compare_depth: default_max_compare_depth(),
            dispatch: DispatchMode::default(),
        }
    }
}

impl TimingConfig {
    /// Debounce quiet period as a `Duration`
    pub const fn debounce_wait(&self) -> Duration {
        Duration::from_millis(self.debounce_wait_ms)
    }

    /// Throttle cooldown as a `Duration`
    pub const fn throttle_limit(&self) -> Duration {
        Duration::from_millis(self.throttle_limit_ms)
    }

    /// Frame interval as a `Duration`
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily-rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
