use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{CalculateGoalsRequest, DailyGoals, UpdateProfileRequest};
use super::repo_types::Profile;
use super::services::{calculate_goals, validate_update, BodyStats};
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/goals/calculate", post(calculate))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    Profile::find(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to load profile", e))?
        .map(ok)
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    validate_update(&mut payload)?;

    let profile = Profile::update(&state.db, user_id, &payload)
        .await
        .map_err(|e| AppError::internal("Failed to update profile", e))?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

    info!(user_id = %user_id, "profile updated");
    Ok(ok(profile))
}

#[instrument(skip(state, payload))]
pub async fn calculate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Option<Json<CalculateGoalsRequest>>,
) -> Result<Json<ApiResponse<DailyGoals>>, AppError> {
    let req = payload.map(|Json(r)| r).unwrap_or_default();
    let profile = Profile::find(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to load profile", e))?;

    let stats = BodyStats::resolve(&req, profile.as_ref())?;
    Ok(ok(calculate_goals(&stats)))
}
