use serde::{Deserialize, Serialize};

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub activity_level: Option<String>,
    pub daily_calorie_goal: Option<i32>,
    pub daily_protein_goal: Option<i32>,
    pub daily_carbs_goal: Option<i32>,
    pub daily_fats_goal: Option<i32>,
    pub preferred_height_unit: Option<String>,
    pub preferred_weight_unit: Option<String>,
    pub dietary_restrictions: Option<Vec<String>>,
}

/// Body stats for the goal calculator. Each field falls back to the stored
/// profile when absent.
#[derive(Debug, Default, Deserialize)]
pub struct CalculateGoalsRequest {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyGoals {
    pub daily_calorie_goal: i32,
    pub daily_protein_goal: i32,
    pub daily_carbs_goal: i32,
    pub daily_fats_goal: i32,
}
