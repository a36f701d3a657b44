use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument};

use super::repo::preferred_weight_unit;
use super::repo_types::UserProgress;
use super::services::demo_data;
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::food_logs::FoodLog;
use crate::profile::{services::DEMO_GOALS, Profile};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/progress", get(get_progress))
        .route("/progress/weight", post(log_weight))
        .route("/progress/seed", post(seed_demo))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub entries: Vec<UserProgress>,
    pub preferred_weight_unit: String,
}

#[derive(Debug, Deserialize)]
pub struct LogWeightRequest {
    pub date: Option<Date>,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub food_logs: usize,
    pub progress_entries: usize,
}

#[instrument(skip(state))]
pub async fn get_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<ApiResponse<ProgressResponse>>, AppError> {
    let entries = UserProgress::list(&state.db, user_id, params.start, params.end)
        .await
        .map_err(|e| AppError::internal("Failed to fetch progress data", e))?;
    let unit = preferred_weight_unit(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch progress data", e))?;

    Ok(ok(ProgressResponse {
        entries,
        preferred_weight_unit: unit,
    }))
}

#[instrument(skip(state, payload))]
pub async fn log_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LogWeightRequest>,
) -> Result<Json<ApiResponse<UserProgress>>, AppError> {
    if !payload.weight.is_finite() || payload.weight <= 0.0 {
        return Err(AppError::BadRequest("Weight must be positive".into()));
    }
    let date = payload
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    let entry = UserProgress::upsert_weight(&state.db, user_id, date, payload.weight)
        .await
        .map_err(|e| AppError::internal("Failed to log weight", e))?;
    info!(user_id = %user_id, %date, weight = payload.weight, "weight logged");
    Ok(ok(entry))
}

/// Replaces the caller's logs and progress with a week of demo data.
#[instrument(skip(state))]
pub async fn seed_demo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<SeedResponse>>, AppError> {
    let demo = demo_data(OffsetDateTime::now_utc().date());

    let seed = async {
        let mut tx = state.db.begin().await?;
        FoodLog::delete_all(&mut tx, user_id).await?;
        UserProgress::delete_all(&mut tx, user_id).await?;
        FoodLog::insert_many(&mut tx, user_id, &demo.logs).await?;
        UserProgress::insert_many(&mut tx, user_id, &demo.progress).await?;
        Profile::set_goals(&mut tx, user_id, &DEMO_GOALS).await?;
        tx.commit().await?;
        anyhow::Ok(())
    };
    seed.await
        .map_err(|e| AppError::internal("Failed to seed demo data", e))?;

    info!(user_id = %user_id, logs = demo.logs.len(), "demo data seeded");
    Ok(ok(SeedResponse {
        food_logs: demo.logs.len(),
        progress_entries: demo.progress.len(),
    }))
}
