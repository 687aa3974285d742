//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::config::ConfigArgs;
use super::commands::demo::DemoArgs;

#[derive(Parser, Debug)]
#[command(name = "pacer")]
#[command(about = "Pacer - debounce, throttle, memoization and deferred-work helpers", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of pacer.yaml
    #[arg(short, long, global = true, env = "PACER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive a timing helper with a synthetic call stream
    Demo(DemoArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}
