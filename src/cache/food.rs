use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::{
    is_fresh, normalize_query, BackgroundWriter, FoodCacheStore, FoodSearchCacheEntry, MemoryTier,
    StaleFallback,
};
use crate::config::CacheConfig;
use crate::error::UpstreamError;
use crate::nutrition::{NutritionData, NutritionProvider};

/// Answers "what is the nutrition profile of X" from memory, then Postgres,
/// then the configured nutrition provider.
pub struct FoodSearchCache {
    memory: MemoryTier<String, Vec<NutritionData>>,
    store: Arc<dyn FoodCacheStore>,
    provider: Arc<dyn NutritionProvider>,
    writer: Arc<BackgroundWriter>,
    ttl: time::Duration,
    fallback: StaleFallback,
}

impl FoodSearchCache {
    pub fn new(
        config: &CacheConfig,
        store: Arc<dyn FoodCacheStore>,
        provider: Arc<dyn NutritionProvider>,
        writer: Arc<BackgroundWriter>,
    ) -> Self {
        let max_age = std::time::Duration::try_from(config.food_ttl).ok();
        Self {
            memory: MemoryTier::new(config.memory_capacity, max_age),
            store,
            provider,
            writer,
            ttl: config.food_ttl,
            fallback: config.food_stale_fallback,
        }
    }

    /// Never fails: upstream errors are logged and produce an empty result
    /// (or stale data, depending on the fallback policy).
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn search(&self, query: &str) -> Vec<NutritionData> {
        let key = normalize_query(query);
        if key.is_empty() {
            return Vec::new();
        }

        if let Some(hit) = self.memory.get(&key).await {
            debug!(query = %key, "cache hit (memory)");
            return hit;
        }

        let mut stale = None;
        match self.store.get(&key).await {
            Ok(Some(entry)) if is_fresh(entry.created_at, OffsetDateTime::now_utc(), self.ttl) => {
                debug!(query = %key, "cache hit (db)");
                self.memory.insert(key, entry.results.clone()).await;
                return entry.results;
            }
            Ok(Some(entry)) => {
                info!(query = %key, "cache stale (db), re-fetching");
                stale = Some(entry.results);
            }
            Ok(None) => debug!(query = %key, "cache miss"),
            Err(e) => warn!(error = %format!("{e:#}"), "error checking db cache"),
        }

        match self.provider.search(query.trim()).await {
            Ok(results) => {
                self.write_through(key, &results).await;
                results
            }
            Err(e) => {
                warn!(error = %e, query = %key, "food search upstream failed");
                match (self.fallback, stale) {
                    (StaleFallback::ServeStale, Some(results)) => {
                        info!(query = %key, "serving stale food search results");
                        results
                    }
                    _ => Vec::new(),
                }
            }
        }
    }

    /// Fetches `query` upstream regardless of what the tiers hold and writes
    /// the result through. Used by the seeding job, which needs to see
    /// upstream failures.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn refresh(&self, query: &str) -> Result<Vec<NutritionData>, UpstreamError> {
        let key = normalize_query(query);
        let results = self.provider.search(query.trim()).await?;
        if !key.is_empty() {
            self.write_through(key, &results).await;
        }
        Ok(results)
    }

    async fn write_through(&self, key: String, results: &[NutritionData]) {
        self.memory.insert(key.clone(), results.to_vec()).await;
        let store = self.store.clone();
        let entry = FoodSearchCacheEntry {
            query: key,
            results: results.to_vec(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.writer
            .spawn("food_search_cache.upsert", async move { store.upsert(entry).await });
    }

    pub async fn clear_memory(&self) {
        self.memory.clear().await;
    }
}
