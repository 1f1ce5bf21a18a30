//! League Data Service
//!
//! Entry point of the `league-data` binary: loads configuration, sets up logging and runs
//! the requested command against a freshly built service.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use league_service::cli::{Cli, CliHandler};
use league_service::{initialize_logging_with_config, load_configuration, LeagueDataService};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    initialize_logging_with_config(&config.logging.level, &config.logging.format)?;

    info!("Starting League Data Service v{}", env!("CARGO_PKG_VERSION"));

    let service = Arc::new(LeagueDataService::new(config)?);
    CliHandler::new(service).handle_command(cli.command).await
}
