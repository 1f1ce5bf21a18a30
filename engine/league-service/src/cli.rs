//! # Command Line Interface
//!
//! `league-data` commands: run the service, or query fixtures and standings once.

use crate::config::to_toml;
use crate::service::LeagueDataService;
use crate::signals::setup_signal_handlers;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Football fixture and standings data service
#[derive(Parser)]
#[command(name = "league-data")]
#[command(about = "Cached football fixtures and grouped playoff standings")]
pub struct Cli {
    /// Configuration file (defaults to $LEAGUE_CONFIG or league-service.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run background refresh until Ctrl+C
    Serve,
    /// Print a season's fixtures as JSON
    Fixtures {
        #[arg(long)]
        season_id: String,
        #[arg(long)]
        season: String,
        /// Bypass the cache and re-sync from upstream
        #[arg(long)]
        force: bool,
    },
    /// Print grouped standings as JSON
    Standings {
        #[arg(long)]
        season_id: String,
        #[arg(long)]
        season: String,
        /// Print the published regular-season table instead
        #[arg(long)]
        regular: bool,
    },
    /// List configured competitions
    Competitions,
    /// Print the effective configuration as TOML
    Config,
}

/// CLI handler
pub struct CliHandler {
    service: Arc<LeagueDataService>,
}

impl CliHandler {
    pub fn new(service: Arc<LeagueDataService>) -> Self {
        Self { service }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Serve => self.serve().await?,
            Commands::Fixtures { season_id, season, force } => {
                let fixtures = self.service.fetch_fixtures(&season_id, &season, force).await?;
                print_json(&fixtures)?;
            }
            Commands::Standings { season_id, season, regular: true } => {
                let table = self.service.regular_standings(&season_id, &season).await?;
                print_json(&table)?;
            }
            Commands::Standings { season_id, season, regular: false } => {
                let grouped = self.service.grouped_standings(&season_id, &season).await?;
                print_json(&grouped)?;
            }
            Commands::Competitions => print_json(&self.service.competitions())?,
            Commands::Config => println!("{}", to_toml(self.service.config())?),
        }
        Ok(())
    }

    async fn serve(&self) -> Result<()> {
        self.service.start_background_tasks();
        let shutdown_signal = setup_signal_handlers();

        info!("League Data Service is running. Press Ctrl+C to shutdown gracefully.");
        let _ = shutdown_signal.await;

        info!("Shutdown signal received. Initiating graceful shutdown...");
        self.service.shutdown().await;

        let stats = self.service.get_cache_stats();
        info!(
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = stats.hit_rate(),
            "League Data Service shutdown complete"
        );
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
