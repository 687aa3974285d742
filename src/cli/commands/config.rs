//! Config CLI commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration after merging files and environment
    Show,
    /// Check a configuration file without running anything
    Validate {
        /// Path to the YAML file
        path: PathBuf,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ConfigShowOutput {
    pub config: Config,
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ConfigValidateOutput {
    pub path: String,
    pub valid: bool,
    pub message: String,
}

impl CommandOutput for ConfigValidateOutput {
    fn to_human(&self) -> String {
        if self.valid {
            format!("{} {}", console::style("ok").green().bold(), self.path)
        } else {
            format!("{} {}: {}", console::style("invalid").red().bold(), self.path, self.message)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            output(&ConfigShowOutput { config: config.clone() }, json_mode);
        }
        ConfigCommands::Validate { path } => {
            let result = ConfigLoader::load_from_file(&path);
            let out = ConfigValidateOutput {
                path: path.display().to_string(),
                valid: result.is_ok(),
                message: result.err().map(|e| format!("{e:#}")).unwrap_or_default(),
            };
            let valid = out.valid;
            output(&out, json_mode);
            if !valid {
                anyhow::bail!("Configuration in {} is invalid", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_output_is_yaml() {
        let human = ConfigShowOutput {
            config: Config::default(),
        }
        .to_human();
        assert!(human.contains("debounce_wait_ms: 300"));
        assert!(human.contains("dispatch: yield"));
    }

    #[test]
    fn test_show_output_json_nests_sections() {
        let json = ConfigShowOutput {
            config: Config::default(),
        }
        .to_json();
        assert_eq!(json["timing"]["frame_interval_ms"], 16);
        assert_eq!(json["logging"]["level"], "info");
    }

    #[tokio::test]
    async fn test_validate_reports_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pacer.yaml");
        std::fs::write(&path, "timing:\n  max_compare_depth: 0\n").unwrap();

        let args = ConfigArgs {
            command: ConfigCommands::Validate { path },
        };
        let err = execute(args, &Config::default(), true).await.unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }
}
