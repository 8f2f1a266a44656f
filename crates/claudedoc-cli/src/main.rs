mod cli;
mod commands;
mod config;
mod context;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::AppConfig;
use context::AppContext;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load(&cli.overrides()).context("Failed to load configuration")?;
    claudedoc_logging::init_logging(&config.logging.level, config.logging.format)?;
    info!("Source root: {:?}", config.site.source_root);

    let mut ctx = AppContext::new(config);
    let result = commands::run(&mut ctx, cli.command.unwrap_or_default()).await;
    ctx.shutdown().await;
    result
}
