use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::pipeline::MealPlanResult;
use super::store::MealPlan;
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_plans).post(generate_plan))
        .route("/meal-plans/:id", delete(delete_plan))
}

#[instrument(skip(state))]
pub async fn generate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<MealPlanResult>>, AppError> {
    let result = state
        .planner
        .run(user_id, OffsetDateTime::now_utc().date())
        .await
        .map_err(|e| AppError::internal("Failed to generate meal plan", e))?;
    info!(user_id = %user_id, plan_id = ?result.plan_id, "meal plan generated");
    Ok(ok(result))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Vec<MealPlan>>>, AppError> {
    let plans = state
        .planner
        .store()
        .list_plans(user_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch meal plans", e))?;
    Ok(ok(plans))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    let deleted = state
        .planner
        .store()
        .delete_plan(user_id, id)
        .await
        .map_err(|e| AppError::internal("Failed to delete meal plan", e))?;
    if !deleted {
        warn!(user_id = %user_id, plan_id = %id, "meal plan not found");
        return Err(AppError::NotFound("Meal plan not found".into()));
    }
    Ok(ok(id))
}
