use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;

use super::RecipeInformation;

#[derive(Debug, Clone)]
pub struct StoredRecipe {
    pub data: RecipeInformation,
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn get(&self, id: i64) -> anyhow::Result<Option<StoredRecipe>>;
    async fn upsert(&self, recipe: &RecipeInformation, updated_at: OffsetDateTime) -> anyhow::Result<()>;
    async fn by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RecipeInformation>>;
}

#[derive(FromRow)]
struct RecipeRow {
    data: Json<RecipeInformation>,
    updated_at: OffsetDateTime,
}

pub struct PgRecipeStore {
    db: PgPool,
}

impl PgRecipeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn get(&self, id: i64) -> anyhow::Result<Option<StoredRecipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"SELECT data, updated_at FROM recipes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select recipe")?;

        Ok(row.map(|r| StoredRecipe {
            data: r.data.0,
            updated_at: r.updated_at,
        }))
    }

    async fn upsert(&self, recipe: &RecipeInformation, updated_at: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recipes (id, title, image, data, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET title = EXCLUDED.title,
                          image = EXCLUDED.image,
                          data = EXCLUDED.data,
                          updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(recipe.id)
        .bind(&recipe.title)
        .bind(recipe.image.as_deref())
        .bind(Json(recipe))
        .bind(updated_at)
        .execute(&self.db)
        .await
        .with_context(|| format!("upsert recipe {}", recipe.id))?;
        Ok(())
    }

    async fn by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RecipeInformation>> {
        let rows: Vec<(Json<RecipeInformation>,)> = sqlx::query_as(
            r#"SELECT data FROM recipes WHERE id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("select recipes by ids")?;
        Ok(rows.into_iter().map(|(data,)| data.0).collect())
    }
}
