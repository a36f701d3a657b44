use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One row per user, created empty at registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid, // same as users.id
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,      // cm
    pub weight: Option<f64>,      // kg
    pub goal_weight: Option<f64>, // kg
    pub activity_level: Option<String>,
    pub daily_calorie_goal: Option<i32>,
    pub daily_protein_goal: Option<i32>,
    pub daily_carbs_goal: Option<i32>,
    pub daily_fats_goal: Option<i32>,
    pub preferred_height_unit: Option<String>,
    pub preferred_weight_unit: Option<String>,
    pub dietary_restrictions: Vec<String>,
    pub updated_at: OffsetDateTime,
}

impl Profile {
    /// A profile with nothing filled in, as stored right after registration.
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            age: None,
            gender: None,
            height: None,
            weight: None,
            goal_weight: None,
            activity_level: None,
            daily_calorie_goal: None,
            daily_protein_goal: None,
            daily_carbs_goal: None,
            daily_fats_goal: None,
            preferred_height_unit: None,
            preferred_weight_unit: None,
            dietary_restrictions: Vec::new(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}
