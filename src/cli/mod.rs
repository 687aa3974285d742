//! Command-line interface for exercising the timing helpers.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

/// Print `err` in the requested format and exit with status 1.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "caused_by": chain,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1)
}
