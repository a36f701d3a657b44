//! Read-through caching in front of the nutrition and recipe APIs.
//!
//! Lookups go process memory → Postgres → upstream. Upstream results are
//! written back to both tiers; the Postgres write runs on the
//! [`BackgroundWriter`] so it never delays the caller.

pub mod food;
pub mod memory;
pub mod store;
pub mod writer;

use time::{Duration, OffsetDateTime};

pub use food::FoodSearchCache;
pub use memory::MemoryTier;
pub use store::{FoodCacheStore, FoodSearchCacheEntry, PgFoodCacheStore};
pub use writer::BackgroundWriter;

/// What a cache returns when the upstream refetch of a stale entry fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleFallback {
    /// Serve the stale persisted value if there is one.
    ServeStale,
    /// Behave as if nothing was cached.
    Empty,
}

/// Cache key for free-text queries.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// `true` while `now - stored_at` is strictly below `ttl`.
pub fn is_fresh(stored_at: OffsetDateTime, now: OffsetDateTime, ttl: Duration) -> bool {
    now - stored_at < ttl
}
