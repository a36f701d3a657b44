use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::NutritionData;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub serving_size_g: f64,
    pub serving_unit: Option<String>,
    pub date: Date,
    pub created_at: OffsetDateTime,
}

/// Insert payload; `created_at` defaults to now when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub serving_size_g: f64,
    pub serving_unit: Option<String>,
    pub date: Date,
    pub created_at: Option<OffsetDateTime>,
}

impl NewFoodLog {
    pub fn from_item(item: &NutritionData, date: Date) -> Self {
        Self {
            name: item.name.clone(),
            calories: item.calories,
            protein_g: item.protein_g,
            carbs_g: item.carbohydrates_total_g,
            fat_g: item.fat_total_g,
            serving_size_g: item.serving_size_g,
            serving_unit: item.serving_unit.clone(),
            date,
            created_at: None,
        }
    }
}
