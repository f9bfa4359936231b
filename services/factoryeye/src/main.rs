//! FactoryEYE CLI
//!
//! Command-line interface for the equipment monitoring service.

use std::path::PathBuf;

use clap::Parser;
use factoryeye::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "factoryeye")]
#[command(about = "Industrial equipment monitoring service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// FactoryEYE API base URL (overrides config file)
    #[arg(long)]
    api_url: Option<String>,

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
        "Parsed command line arguments: config={:?}, dashboard_port={:?}, api_url={:?}, log_level={:?}",
        args.config,
        args.dashboard_port,
        args.api_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }

    if config.users.is_empty() {
        tracing::warn!("No users configured; dashboard login will always fail");
    }

    tracing::info!("Starting FactoryEYE service");
    factoryeye::run(config).await?;

    Ok(())
}
