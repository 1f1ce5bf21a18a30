use crate::error::StoreError;
use crate::models::{Fixture, FixtureKey, SyncMetadata};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Outcome of `FixtureStore::upsert_fixtures`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Durable home for synchronized fixtures, keyed by `FixtureKey`
#[async_trait]
pub trait FixtureStore: Send + Sync {
    /// Insert new fixtures and overwrite existing ones with the same natural key
    async fn upsert_fixtures(&self, fixtures: &[Fixture]) -> Result<UpsertSummary, StoreError>;

    async fn put_metadata(&self, metadata: &SyncMetadata) -> Result<(), StoreError>;

    async fn fixtures_for_season(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Vec<Fixture>, StoreError>;

    async fn metadata(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Option<SyncMetadata>, StoreError>;
}

/// Process-local `FixtureStore`
#[derive(Default)]
pub struct InMemoryFixtureStore {
    fixtures: RwLock<HashMap<FixtureKey, Fixture>>,
    metadata: RwLock<HashMap<(String, String), SyncMetadata>>,
}

impl InMemoryFixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fixtures.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.read().is_empty()
    }
}

#[async_trait]
impl FixtureStore for InMemoryFixtureStore {
    async fn upsert_fixtures(&self, fixtures: &[Fixture]) -> Result<UpsertSummary, StoreError> {
        let mut stored = self.fixtures.write();
        let mut summary = UpsertSummary::default();

        for fixture in fixtures {
            match stored.insert(fixture.key(), fixture.clone()) {
                Some(_) => summary.updated += 1,
                None => summary.inserted += 1,
            }
        }

        Ok(summary)
    }

    async fn put_metadata(&self, metadata: &SyncMetadata) -> Result<(), StoreError> {
        self.metadata
            .write()
            .insert((metadata.season_id.clone(), metadata.season.clone()), metadata.clone());
        Ok(())
    }

    async fn fixtures_for_season(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Vec<Fixture>, StoreError> {
        Ok(self
            .fixtures
            .read()
            .values()
            .filter(|f| f.season_id == season_id && f.season == season)
            .cloned()
            .collect())
    }

    async fn metadata(
        &self,
        season_id: &str,
        season: &str,
    ) -> Result<Option<SyncMetadata>, StoreError> {
        Ok(self.metadata.read().get(&(season_id.to_string(), season.to_string())).cloned())
    }
}
