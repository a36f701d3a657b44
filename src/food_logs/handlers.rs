use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{FoodLogQuery, FoodSearchQuery, LogFoodRequest, ParseTextRequest};
use super::parser::parse_meal_text;
use super::repo_types::{FoodLog, NewFoodLog};
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::nutrition::NutritionData;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foods/search", get(search_foods))
        .route("/food-logs", get(list_logs).post(log_food))
        .route("/food-logs/parse", post(parse_text))
        .route("/food-logs/:id", delete(delete_log))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<FoodSearchQuery>,
) -> Result<Json<ApiResponse<Vec<NutritionData>>>, AppError> {
    if params.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query parameter is required".into()));
    }
    Ok(ok(state.food_cache.search(&params.query).await))
}

#[instrument(skip(state, payload))]
pub async fn log_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LogFoodRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FoodLog>>), AppError> {
    if payload.item.name.trim().is_empty() {
        return Err(AppError::BadRequest("Food name is required".into()));
    }
    let date = payload
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    let log = FoodLog::insert(&state.db, user_id, &NewFoodLog::from_item(&payload.item, date))
        .await
        .map_err(|e| AppError::internal("Failed to log food", e))?;

    info!(user_id = %user_id, log_id = %log.id, name = %log.name, "food logged");
    Ok((StatusCode::CREATED, ok(log)))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<FoodLogQuery>,
) -> Result<Json<ApiResponse<Vec<FoodLog>>>, AppError> {
    let (start, end) = params.range(OffsetDateTime::now_utc().date());
    if start > end {
        return Err(AppError::BadRequest("start must not be after end".into()));
    }
    let logs = FoodLog::list_between(&state.db, user_id, start, end)
        .await
        .map_err(|e| AppError::internal("Failed to fetch food logs", e))?;
    Ok(ok(logs))
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    let deleted = FoodLog::delete(&state.db, user_id, id)
        .await
        .map_err(|e| AppError::internal("Failed to delete food log", e))?;
    if !deleted {
        warn!(user_id = %user_id, log_id = %id, "food log not found");
        return Err(AppError::NotFound("Food log not found".into()));
    }
    Ok(ok(id))
}

#[instrument(skip(state, payload))]
pub async fn parse_text(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Json(payload): Json<ParseTextRequest>,
) -> Result<Json<ApiResponse<Vec<NutritionData>>>, AppError> {
    if payload.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text is required".into()));
    }
    parse_meal_text(&state.llm, payload.text.trim())
        .await
        .map(ok)
        .map_err(|e| AppError::internal("Failed to analyze text", e))
}
