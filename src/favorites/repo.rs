use sqlx::{types::Json, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::repo_types::{FavoriteFood, FavoriteRecipe};
use crate::nutrition::NutritionData;

impl FavoriteRecipe {
    /// Removes the favorite if present, otherwise adds it. Returns whether the
    /// recipe is a favorite afterwards. A concurrent toggle that inserts the
    /// same row first leaves it favorited.
    pub async fn toggle(
        db: &PgPool,
        user_id: Uuid,
        recipe_id: i64,
        title: &str,
        image: Option<&str>,
    ) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;
        let removed = sqlx::query(
            r#"DELETE FROM favorite_recipes WHERE user_id = $1 AND recipe_id = $2"#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            let inserted = sqlx::query(
                r#"
                INSERT INTO favorite_recipes (user_id, recipe_id, title, image)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, recipe_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(recipe_id)
            .bind(title)
            .bind(image)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if inserted == 0 {
                debug!(user_id = %user_id, recipe_id, "favorite already inserted concurrently");
            }
        }
        tx.commit().await?;
        Ok(removed == 0)
    }

    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FavoriteRecipe>> {
        let rows = sqlx::query_as::<_, FavoriteRecipe>(
            r#"
            SELECT user_id, recipe_id, title, image, created_at
            FROM favorite_recipes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl FavoriteFood {
    pub async fn add(db: &PgPool, user_id: Uuid, food: &NutritionData) -> anyhow::Result<FavoriteFood> {
        let row = sqlx::query_as::<_, FavoriteFood>(
            r#"
            INSERT INTO favorite_foods (user_id, food)
            VALUES ($1, $2)
            RETURNING id, user_id, food, created_at
            "#,
        )
        .bind(user_id)
        .bind(Json(food))
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FavoriteFood>> {
        let rows = sqlx::query_as::<_, FavoriteFood>(
            r#"
            SELECT id, user_id, food, created_at
            FROM favorite_foods
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM favorite_foods WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
