use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use restaurant_order_cli::{
    cli::{Args, CliApp},
    utils::{log_directive, Settings},
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    dotenv::dotenv().ok();
    let directive = log_directive(args.verbose, |key| std::env::var(key).ok());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .init();

    tracing::info!("🍕 Restaurant order CLI starting...");

    let mut settings = Settings::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    if let Some(path) = &args.data {
        settings.menu_data_path = Some(PathBuf::from(path));
    }

    let mut cli = CliApp::new(&settings).map_err(|e| {
        tracing::error!("Failed to start: {:#}", e);
        e
    })?;
    cli.run(args.command)?;

    tracing::info!("🍕 Restaurant order CLI stopped");
    Ok(())
}
