use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::NutritionData;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FavoriteRecipe {
    pub user_id: Uuid,
    pub recipe_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FavoriteFood {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food: Json<NutritionData>,
    pub created_at: OffsetDateTime,
}
