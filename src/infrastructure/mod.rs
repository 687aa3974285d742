//! Infrastructure layer
//!
//! Configuration loading, logging, and concrete adapters for the host
//! scheduling ports.

pub mod config;
pub mod logging;
pub mod scheduling;
