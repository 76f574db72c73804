//! RDV Monitor CLI
//!
//! Command-line interface for the ANEM appointment monitoring service.

use std::path::PathBuf;

use clap::Parser;
use rdvmonitor::{load_config, ServiceConfig};
use tracing::Level;

#[derive(Parser)]
#[command(name = "rdvmonitor")]
#[command(about = "ANEM appointment monitoring and notification service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API port (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Seconds between scheduled checks (overrides config file)
    #[arg(long)]
    check_interval: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, port={:?}, check_interval={:?}, log_level={:?}",
        args.config,
        args.port,
        args.check_interval,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        ServiceConfig::default()
    };

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(check_interval) = args.check_interval {
        config.check_interval_seconds = check_interval;
    }

    tracing::info!(
        "Starting monitor service on port {} (check every {}s)",
        config.port,
        config.check_interval_seconds
    );
    rdvmonitor::run(config).await?;

    Ok(())
}
