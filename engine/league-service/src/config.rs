//! Service configuration management

use anyhow::{anyhow, bail, Context, Result};
use fixture_sync::config::default_competitions;
use fixture_sync::{CompetitionConfig, SyncConfig, SyncMode};
use serde::{Deserialize, Serialize};
use sports_fetcher::FetcherConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use ttl_cache::CacheConfig;

/// Config file used when neither `--config` nor `LEAGUE_CONFIG` is given
pub const DEFAULT_CONFIG_FILE: &str = "league-service.toml";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueServiceConfig {
    /// Upstream API, rate limits and retry
    pub fetcher: FetcherConfig,

    /// Cache sizing, default TTL and sweep interval
    pub cache: CacheConfig,

    /// Round scan and fixture TTL
    pub sync: SyncConfig,

    pub competitions: Vec<CompetitionConfig>,

    /// Service-level configuration
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Background refresh of tracked seasons
    pub scheduler: SchedulerConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// TTL of a cached league table
    pub table_ttl_secs: u64,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSeason {
    pub season_id: String,
    pub season: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub tracked_seasons: Vec<TrackedSeason>,
}

impl Default for LeagueServiceConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            cache: CacheConfig::default(),
            sync: SyncConfig::default(),
            competitions: default_competitions(),
            service: ServiceSettings::default(),
            logging: LoggingConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { table_ttl_secs: 60 * 60, shutdown_timeout_secs: 10 }
    }
}

impl ServiceSettings {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: false, interval_secs: 30 * 60, tracked_seasons: Vec::new() }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl LeagueServiceConfig {
    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.base_url.trim().is_empty() {
            bail!("fetcher.base_url must not be empty");
        }
        let limits = std::iter::once(("default", &self.fetcher.default_rate_limit))
            .chain(self.fetcher.rate_limits.iter().map(|(class, limit)| (class.as_str(), limit)));
        for (class, limit) in limits {
            if limit.window_ms == 0 || limit.max_requests == 0 {
                bail!("Rate limit for '{}' needs a non-zero window and request count", class);
            }
        }

        if self.sync.round_ceiling == 0 {
            bail!("sync.round_ceiling must be at least 1");
        }
        if let SyncMode::Exhaustive { concurrency: 0 } = self.sync.mode {
            bail!("sync.mode.concurrency must be at least 1");
        }

        let mut seen = HashSet::new();
        for competition in &self.competitions {
            if !seen.insert(competition.season_id.as_str()) {
                bail!("Competition {} is configured twice", competition.season_id);
            }
            let final_round = competition.final_regular_round;
            if final_round == 0 || final_round > self.sync.round_ceiling {
                bail!(
                    "Competition {}: final_regular_round {} is outside 1..={}",
                    competition.season_id,
                    competition.final_regular_round,
                    self.sync.round_ceiling
                );
            }
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => bail!("Invalid log level: {}", self.logging.level),
        }
        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => {}
            _ => bail!("Invalid log format: {}", self.logging.format),
        }

        if self.scheduler.enabled {
            if self.scheduler.interval_secs == 0 {
                bail!("scheduler.interval_secs must be non-zero when the scheduler is enabled");
            }
            for tracked in &self.scheduler.tracked_seasons {
                if !seen.contains(tracked.season_id.as_str()) {
                    bail!(
                        "Tracked season {} ({}) has no configured competition",
                        tracked.season_id,
                        tracked.season
                    );
                }
            }
        }

        Ok(())
    }
}

/// Resolve the config file: explicit path, then `LEAGUE_CONFIG`, then the default name
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("LEAGUE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration: defaults, then the TOML file if present, then `LEAGUE__*` variables
pub fn load_config(explicit: Option<&Path>) -> Result<LeagueServiceConfig> {
    dotenv::dotenv().ok();

    let path = config_path(explicit);
    let defaults = config::Config::try_from(&LeagueServiceConfig::default())
        .context("Failed to build default configuration")?;

    let settings = config::Config::builder()
        .add_source(defaults)
        .add_source(config::File::from(path.as_path()).required(false))
        .add_source(
            config::Environment::with_prefix("LEAGUE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {:?}", path))?;

    let config: LeagueServiceConfig = settings
        .try_deserialize()
        .map_err(|e| anyhow!("Invalid configuration in {:?}: {}", path, e))?;

    config.validate()?;
    tracing::debug!("Loaded configuration from {:?}", path);
    Ok(config)
}

/// Effective configuration as TOML
pub fn to_toml(config: &LeagueServiceConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration")
}
