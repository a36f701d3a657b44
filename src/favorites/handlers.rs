use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{ToggleRecipeRequest, ToggleRecipeResponse};
use super::repo_types::{FavoriteFood, FavoriteRecipe};
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::nutrition::NutritionData;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorites/recipes", get(list_recipes))
        .route("/favorites/recipes/:id/toggle", post(toggle_recipe))
        .route("/favorites/foods", get(list_foods).post(add_food))
        .route("/favorites/foods/:id", delete(delete_food))
}

#[instrument(skip(state, payload))]
pub async fn toggle_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<i64>,
    Json(payload): Json<ToggleRecipeRequest>,
) -> Result<Json<ApiResponse<ToggleRecipeResponse>>, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("Recipe title is required".into()));
    }
    let favorited = FavoriteRecipe::toggle(
        &state.db,
        user_id,
        recipe_id,
        payload.title.trim(),
        payload.image.as_deref(),
    )
    .await
    .map_err(|e| AppError::internal("Failed to update favorites", e))?;

    info!(user_id = %user_id, recipe_id, favorited, "recipe favorite toggled");
    Ok(ok(ToggleRecipeResponse {
        recipe_id,
        favorited,
    }))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Vec<FavoriteRecipe>>>, AppError> {
    let rows = FavoriteRecipe::list(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch favorites", e))?;
    Ok(ok(rows))
}

#[instrument(skip(state, food))]
pub async fn add_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(food): Json<NutritionData>,
) -> Result<(StatusCode, Json<ApiResponse<FavoriteFood>>), AppError> {
    if food.name.trim().is_empty() {
        return Err(AppError::BadRequest("Food name is required".into()));
    }
    let row = FavoriteFood::add(&state.db, user_id, &food)
        .await
        .map_err(|e| AppError::internal("Failed to save favorite food", e))?;
    info!(user_id = %user_id, favorite_id = %row.id, "food favorited");
    Ok((StatusCode::CREATED, ok(row)))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Vec<FavoriteFood>>>, AppError> {
    let rows = FavoriteFood::list(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch favorites", e))?;
    Ok(ok(rows))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    let deleted = FavoriteFood::delete(&state.db, user_id, id)
        .await
        .map_err(|e| AppError::internal("Failed to delete favorite food", e))?;
    if !deleted {
        warn!(user_id = %user_id, favorite_id = %id, "favorite food not found");
        return Err(AppError::NotFound("Favorite not found".into()));
    }
    Ok(ok(id))
}
