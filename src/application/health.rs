use std::sync::Arc;

use crate::application::repos::{RepoError, StatsRepo};
use crate::domain::entities::ContentCounts;

/// Liveness check backed by a real storage round trip.
#[derive(Clone)]
pub struct HealthService {
    stats: Arc<dyn StatsRepo>,
}

impl HealthService {
    pub fn new(stats: Arc<dyn StatsRepo>) -> Self {
        Self { stats }
    }

    /// Row counts read straight from storage, bypassing the cache.
    pub async fn counts(&self) -> Result<ContentCounts, RepoError> {
        self.stats.content_counts().await
    }
}
