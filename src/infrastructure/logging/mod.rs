//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty output on stderr
//! - Optional daily-rolling JSON log files

pub mod logger;

pub use logger::{LogFormat, LoggerImpl};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, trace, warn};
