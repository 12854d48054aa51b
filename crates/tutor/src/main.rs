//! Tutor - Learning backend server
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! tutor
//! tutor --config configs/tutor.toml
//!
//! # Check a config file without starting anything
//! tutor check --config configs/tutor.toml
//! ```

mod cmd;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tutor_config::{Config, LogFormat};

/// Tutor - Learning backend server
#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve(cmd::serve::ServeArgs),

    /// Validate a configuration file and print the effective settings
    Check(cmd::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(mut args)) => {
            // Global --config fills in when the subcommand has none
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            init_logging(cli.log_level.as_deref(), args.config.as_deref())?;
            cmd::serve::run(args).await
        }
        Some(Command::Check(mut args)) => {
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            // Check only prints to stdout
            cmd::check::run(args)
        }
        None => {
            init_logging(cli.log_level.as_deref(), cli.config.as_deref())?;
            let args = cmd::serve::ServeArgs { config: cli.config };
            cmd::serve::run(args).await
        }
    }
}

/// Initialize the tracing subscriber
///
/// Level resolves CLI flag > config file > "info". `RUST_LOG` is not
/// consulted so the flag stays authoritative.
fn init_logging(cli_level: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let log = config_path
        .filter(|path| path.exists())
        .and_then(|path| Config::from_file(path).ok())
        .map(|config| config.log)
        .unwrap_or_default();

    let filter = EnvFilter::try_new(log.directive(cli_level))
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }

    Ok(())
}
