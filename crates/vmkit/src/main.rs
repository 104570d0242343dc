//! vmkit - Entry Point
//!
//! Boots the composition root headlessly and walks a navigation script,
//! printing the resulting page history as JSON.
//!
//! ```text
//! vmkit --config vmkit.toml /Home /Settings back /About
//! ```

use clap::Parser;
use vmkit::shell::{ShellOptions, run_shell};

/// Command line interface for the vmkit shell
#[derive(Parser, Debug)]
#[command(name = "vmkit")]
#[command(about = "vmkit - Headless navigation and messaging shell")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Register only these route paths (default: every path in the script)
    #[arg(short, long = "route")]
    pub routes: Vec<String>,

    /// Navigation script: route paths, or `back`
    pub steps: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = ShellOptions {
        config_path: cli.config,
        routes: cli.routes,
        steps: cli.steps,
    };
    let report = run_shell(&options).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
