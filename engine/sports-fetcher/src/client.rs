use crate::config::FetcherConfig;
use crate::error::Result;
use crate::fetcher::RateLimitedFetcher;
use crate::models::{EventsResponse, TableResponse, UpstreamEvent, UpstreamTableRow};
use crate::resource;
use std::sync::Arc;
use tracing::info;

/// Typed endpoints of the upstream sports API
pub struct SportsApiClient {
    fetcher: Arc<RateLimitedFetcher>,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl SportsApiClient {
    /// Create a new client over an existing fetcher
    pub fn new(fetcher: Arc<RateLimitedFetcher>, config: &FetcherConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
        }
    }

    /// Create a reqwest-backed client from configuration
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        let fetcher = RateLimitedFetcher::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }

    pub fn events_url(&self, season_id: &str, round: u32, season: &str) -> String {
        format!(
            "{}/{}/eventsround.php?id={}&r={}&s={}",
            self.base_url, self.api_key, season_id, round, season
        )
    }

    pub fn table_url(&self, season_id: &str, season: &str) -> String {
        format!("{}/{}/lookuptable.php?l={}&s={}", self.base_url, self.api_key, season_id, season)
    }

    /// Fetch all events of one round; an empty round yields an empty vector
    pub async fn events_by_round(
        &self,
        season_id: &str,
        round: u32,
        season: &str,
    ) -> Result<Vec<UpstreamEvent>> {
        let url = self.events_url(season_id, round, season);
        let response: EventsResponse =
            self.fetcher.fetch_typed(&url, resource::FIXTURES, self.max_retries).await?;

        let events = response.events.unwrap_or_default();
        info!("Fetched {} events for {} round {} ({})", events.len(), season_id, round, season);
        Ok(events)
    }

    /// Fetch the league table for a season
    pub async fn standings_table(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Vec<UpstreamTableRow>> {
        let url = self.table_url(season_id, season);
        let response: TableResponse =
            self.fetcher.fetch_typed(&url, resource::TABLE, self.max_retries).await?;

        let table = response.table.unwrap_or_default();
        info!("Fetched table with {} rows for {} ({})", table.len(), season_id, season);
        Ok(table)
    }
}
