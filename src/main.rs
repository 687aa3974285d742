//! Pacer CLI entry point.

use anyhow::Result;
use clap::Parser;

use pacer::cli::{handle_error, Cli, Commands};
use pacer::domain::models::Config;
use pacer::infrastructure::config::ConfigLoader;
use pacer::infrastructure::logging::LoggerImpl;

fn load_config(cli: &Cli) -> Result<Config> {
    match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Demo(args) => pacer::cli::commands::demo::execute(args, &config, cli.json).await,
        Commands::Config(args) => pacer::cli::commands::config::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
