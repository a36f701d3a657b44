use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::recommender::RecipeRecommendation;
use crate::food_logs::FoodLog;
use crate::profile::Profile;

#[derive(Debug, Clone, Serialize)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub analysis: String,
    pub suggestions: Vec<RecipeRecommendation>,
    pub created_at: OffsetDateTime,
}

#[derive(FromRow)]
struct MealPlanRow {
    id: Uuid,
    user_id: Uuid,
    analysis: String,
    suggestions: Json<Vec<RecipeRecommendation>>,
    created_at: OffsetDateTime,
}

impl From<MealPlanRow> for MealPlan {
    fn from(r: MealPlanRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            analysis: r.analysis,
            suggestions: r.suggestions.0,
            created_at: r.created_at,
        }
    }
}

/// Everything the meal-planning pipeline reads or writes.
#[async_trait]
pub trait PlannerStore: Send + Sync {
    async fn logs_on(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLog>>;
    async fn profile(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    async fn save_plan(
        &self,
        user_id: Uuid,
        analysis: &str,
        suggestions: &[RecipeRecommendation],
    ) -> anyhow::Result<MealPlan>;
    /// Newest first.
    async fn list_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<MealPlan>>;
    async fn delete_plan(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

pub struct PgPlannerStore {
    db: PgPool,
}

impl PgPlannerStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlannerStore for PgPlannerStore {
    async fn logs_on(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLog>> {
        FoodLog::list_on(&self.db, user_id, date)
            .await
            .context("load today's food logs")
    }

    async fn profile(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        Profile::find(&self.db, user_id).await.context("load profile")
    }

    async fn save_plan(
        &self,
        user_id: Uuid,
        analysis: &str,
        suggestions: &[RecipeRecommendation],
    ) -> anyhow::Result<MealPlan> {
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            INSERT INTO meal_plans (user_id, analysis, suggestions)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, analysis, suggestions, created_at
            "#,
        )
        .bind(user_id)
        .bind(analysis)
        .bind(Json(suggestions))
        .fetch_one(&self.db)
        .await
        .context("insert meal plan")?;
        Ok(row.into())
    }

    async fn list_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<MealPlan>> {
        let rows = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT id, user_id, analysis, suggestions, created_at
            FROM meal_plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list meal plans")?;
        Ok(rows.into_iter().map(MealPlan::from).collect())
    }

    async fn delete_plan(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM meal_plans WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete meal plan")?;
        Ok(res.rows_affected() > 0)
    }
}
