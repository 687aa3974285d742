//! Domain layer for Pacer
//!
//! Value model, configuration model, errors and ports for the timing helpers.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{TimingError, TimingResult};
