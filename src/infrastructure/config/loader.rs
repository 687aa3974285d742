use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Data, Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Upper bound accepted for `timing.max_compare_depth`
pub const MAX_COMPARE_DEPTH_LIMIT: usize = 4096;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {field}: 0. Timing windows must be at least 1ms")]
    ZeroWindow { field: &'static str },

    #[error("Invalid max_compare_depth: {0}. Must be between 1 and 4096")]
    InvalidCompareDepth(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. pacer.yaml (project config)
    /// 3. pacer.local.yaml (local overrides, optional)
    /// 4. Environment variables (PACER_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        Self::load_layered(Yaml::file("pacer.yaml"), Yaml::file("pacer.local.yaml"))
    }

    /// Load configuration with the same layering as [`load`](Self::load),
    /// reading `pacer.yaml` and `pacer.local.yaml` from `dir`
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        Self::load_layered(
            Yaml::file(dir.join("pacer.yaml")),
            Yaml::file(dir.join("pacer.local.yaml")),
        )
    }

    fn load_layered(project: Data<Yaml>, local: Data<Yaml>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(project)
            .merge(local)
            .merge(Env::prefixed("PACER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("PACER_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let timing = &config.timing;

        for (field, value) in [
            ("debounce_wait_ms", timing.debounce_wait_ms),
            ("throttle_limit_ms", timing.throttle_limit_ms),
            ("frame_interval_ms", timing.frame_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroWindow { field });
            }
        }

        if timing.max_compare_depth == 0 || timing.max_compare_depth > MAX_COMPARE_DEPTH_LIMIT {
            return Err(ConfigError::InvalidCompareDepth(timing.max_compare_depth));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
