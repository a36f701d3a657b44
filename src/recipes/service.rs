use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};

use super::{RecipeInformation, RecipeProvider, RecipeSearchResponse, RecipeStore};
use crate::cache::{normalize_query, MemoryTier, StaleFallback};
use crate::config::CacheConfig;

/// Recipe lookups with a persistent per-id cache and an in-process search
/// cache in front of the recipe provider.
pub struct RecipeService {
    provider: Arc<dyn RecipeProvider>,
    store: Arc<dyn RecipeStore>,
    searches: MemoryTier<(String, u32), RecipeSearchResponse>,
    ttl: time::Duration,
    fallback: StaleFallback,
}

impl RecipeService {
    pub fn new(
        config: &CacheConfig,
        provider: Arc<dyn RecipeProvider>,
        store: Arc<dyn RecipeStore>,
    ) -> Self {
        Self {
            provider,
            store,
            searches: MemoryTier::new(config.memory_capacity, Some(config.recipe_search_ttl)),
            ttl: config.recipe_ttl,
            fallback: config.recipe_stale_fallback,
        }
    }

    #[instrument(skip(self))]
    pub async fn information(&self, id: i64) -> Option<RecipeInformation> {
        let cached = match self.store.get(id).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "error reading cached recipe");
                None
            }
        };

        let now = OffsetDateTime::now_utc();
        if let Some(stored) = &cached {
            if now - stored.updated_at <= self.ttl {
                debug!("recipe cache hit");
                return Some(stored.data.clone());
            }
            info!("recipe cache stale, re-fetching");
        }

        match self.provider.information(id).await {
            Ok(info) => {
                if let Err(e) = self.store.upsert(&info, now).await {
                    error!(error = %format!("{e:#}"), "failed to cache recipe");
                }
                Some(info)
            }
            Err(e) => {
                warn!(error = %e, "recipe information upstream failed");
                match (self.fallback, cached) {
                    (StaleFallback::ServeStale, Some(stored)) => {
                        info!("serving stale recipe");
                        Some(stored.data)
                    }
                    _ => None,
                }
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, number: u32) -> Option<RecipeSearchResponse> {
        let key = (normalize_query(query), number);
        if let Some(hit) = self.searches.get(&key).await {
            debug!("recipe search cache hit");
            return Some(hit);
        }

        match self.provider.search(query.trim(), number).await {
            Ok(res) => {
                self.searches.insert(key, res.clone()).await;
                Some(res)
            }
            Err(e) => {
                warn!(error = %e, "recipe search upstream failed");
                None
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn by_ids(&self, ids: &[i64]) -> Vec<RecipeInformation> {
        if ids.is_empty() {
            return Vec::new();
        }
        self.store.by_ids(ids).await.unwrap_or_else(|e| {
            error!(error = %format!("{e:#}"), "error fetching recipes by ids");
            Vec::new()
        })
    }

    pub async fn clear_memory(&self) {
        self.searches.clear().await;
    }
}
