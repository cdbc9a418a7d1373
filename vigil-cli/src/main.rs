//! # Vigil CLI
//!
//! Command-line client for the Vigil account monitor.
//!
//! This CLI provides commands for:
//! - Authorizing against the trading platform and exchanging the code
//! - Verifying relay tokens
//! - Watching live account, position and P&L updates

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{auth, watch};
use vigil_core::config::{ConfigFormat, ConfigLoader, VigilConfig};
use vigil_telemetry::logging::{LogConfig, WorkerGuard, init_logging};

/// Vigil - live trading account monitor
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "vigil.yaml")]
    config: String,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the OAuth authorization URL
    Authorize,

    /// Exchange an authorization code for a relay token
    Exchange(auth::ExchangeArgs),

    /// Check whether a relay token is valid
    Verify(auth::VerifyArgs),

    /// Stream live account state
    Watch(watch::WatchArgs),

    /// Show version and effective configuration
    Info,
}

fn setup_logging(config: &VigilConfig, verbose: bool) -> Result<Vec<WorkerGuard>> {
    let mut log_config = LogConfig::from(&config.logging);
    if verbose {
        log_config.level = "debug".to_string();
    }
    init_logging(&log_config).context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: VigilConfig = ConfigLoader::new()
        .with_env_prefix("VIGIL")
        .load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    let _guards = setup_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Authorize => auth::authorize(&config)?,
        Commands::Exchange(args) => auth::exchange(&config, args).await?,
        Commands::Verify(args) => auth::verify(&config, args).await?,
        Commands::Watch(args) => watch::run(&config, args).await?,
        Commands::Info => print_info(&config)?,
    }

    Ok(())
}

fn print_info(config: &VigilConfig) -> Result<()> {
    println!("Vigil Account Monitor");
    println!("=====================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Message types:");
    for kind in vigil_gateway::relay::MessageType::ALL {
        println!("  - {kind}");
    }
    println!();
    println!("Effective configuration:");
    let rendered = ConfigLoader::serialize(config, ConfigFormat::Yaml)?;
    print!("{rendered}");
    Ok(())
}
