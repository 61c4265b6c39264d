//! Pressure Watcher CLI
//!
//! Command-line interface for the pressure gauge upload service and dashboard.

use std::path::PathBuf;

use clap::Parser;
use pressure_watcher::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "pressure-watcher")]
#[command(about = "Pressure gauge upload service and live dashboard")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upload API port (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

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
        "Parsed command line arguments: config={:?}, port={:?}, dashboard_port={:?}, log_level={:?}",
        args.config,
        args.port,
        args.dashboard_port,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }

    tracing::info!("Starting pressure-watcher service");
    tracing::debug!(
        "Store: enabled={}, capacity={}; dashboard source: {:?}",
        config.store.enabled,
        config.store.capacity,
        config.dashboard.source
    );

    pressure_watcher::run(config).await?;

    Ok(())
}
