//! Check command - Validate configuration without starting the server

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::serve::load_config;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Load and validate the configuration, then print a summary
pub fn run(args: CheckArgs) -> Result<()> {
    let config = load_config(args.config)?;

    println!("configuration OK");
    println!("  listen:     {}", config.server.bind_addr());
    println!("  database:   {}", config.database.db_path().display());
    println!(
        "  cache:      {:?} ({}, command timeout {:?})",
        config.cache.backend, config.cache.url, config.cache.command_timeout
    );
    println!("  sms:        {:?}", config.sms.provider);
    println!("  otp:        {} digits, ttl {:?}", config.otp.digits, config.otp.ttl);
    println!(
        "  jwt secret: {}",
        if config.auth.jwt_secret.is_some() {
            "configured"
        } else {
            "random per process"
        }
    );
    Ok(())
}
