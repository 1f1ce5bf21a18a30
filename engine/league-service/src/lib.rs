//! League Data Service
//!
//! Wires the upstream fetcher, the TTL caches, the fixture synchronizer and the standings
//! calculator into one service, with configuration loading, logging setup, background
//! refresh and graceful shutdown for the `league-data` binary.

use anyhow::{Context, Result};
use std::path::Path;

pub mod cli;
pub mod config;
pub mod logging;
pub mod scheduler;
pub mod service;
pub mod signals;

pub use config::LeagueServiceConfig;
pub use logging::initialize_logging_with_config;
pub use scheduler::{refresh_seasons, RefreshReport, RefreshScheduler};
pub use service::{match_result, standing_from_row, LeagueDataService};
pub use signals::setup_signal_handlers;

/// Load configuration from files and environment variables
pub fn load_configuration(path: Option<&Path>) -> Result<LeagueServiceConfig> {
    config::load_config(path).context("Failed to load service configuration")
}
