use async_trait::async_trait;
use sports_fetcher::{FetchError, SportsApiClient, UpstreamEvent, UpstreamTableRow};

/// Upstream data the synchronizer and the standings service read from
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Events of one round; an empty round is `Ok(vec![])`
    async fn events_by_round(
        &self,
        season_id: &str,
        round: u32,
        season: &str,
    ) -> Result<Vec<UpstreamEvent>, FetchError>;

    /// Published league table
    async fn standings_table(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Vec<UpstreamTableRow>, FetchError>;
}

#[async_trait]
impl UpstreamSource for SportsApiClient {
    async fn events_by_round(
        &self,
        season_id: &str,
        round: u32,
        season: &str,
    ) -> Result<Vec<UpstreamEvent>, FetchError> {
        SportsApiClient::events_by_round(self, season_id, round, season).await
    }

    async fn standings_table(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Vec<UpstreamTableRow>, FetchError> {
        SportsApiClient::standings_table(self, season_id, season).await
    }
}
