use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;

use crate::nutrition::NutritionData;

/// One persisted search: at most one row per normalized query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSearchCacheEntry {
    pub query: String,
    pub results: Vec<NutritionData>,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait FoodCacheStore: Send + Sync {
    async fn get(&self, query: &str) -> anyhow::Result<Option<FoodSearchCacheEntry>>;

    /// Inserts or replaces the row for `entry.query`.
    async fn upsert(&self, entry: FoodSearchCacheEntry) -> anyhow::Result<()>;
}

#[derive(FromRow)]
struct FoodCacheRow {
    query: String,
    results: Json<Vec<NutritionData>>,
    created_at: OffsetDateTime,
}

pub struct PgFoodCacheStore {
    db: PgPool,
}

impl PgFoodCacheStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodCacheStore for PgFoodCacheStore {
    async fn get(&self, query: &str) -> anyhow::Result<Option<FoodSearchCacheEntry>> {
        let row = sqlx::query_as::<_, FoodCacheRow>(
            r#"
            SELECT query, results, created_at
              FROM food_search_cache
             WHERE query = $1
            "#,
        )
        .bind(query)
        .fetch_optional(&self.db)
        .await
        .context("select food_search_cache")?;

        Ok(row.map(|r| FoodSearchCacheEntry {
            query: r.query,
            results: r.results.0,
            created_at: r.created_at,
        }))
    }

    async fn upsert(&self, entry: FoodSearchCacheEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO food_search_cache (query, results, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (query)
            DO UPDATE SET results = EXCLUDED.results, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&entry.query)
        .bind(Json(&entry.results))
        .bind(entry.created_at)
        .execute(&self.db)
        .await
        .with_context(|| format!("upsert food_search_cache {:?}", entry.query))?;
        Ok(())
    }
}
