use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{RecipeInformation, RecipeSearchResponse};
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(recipes_by_ids))
        .route("/recipes/search", get(search_recipes))
        .route("/recipes/:id", get(get_recipe))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_number")]
    pub number: u32,
}

fn default_number() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct IdsParams {
    #[serde(default)]
    pub ids: String,
}

/// Parses `1,2, 3` into ids; blank segments are skipped.
fn parse_ids(raw: &str) -> Result<Vec<i64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("Invalid recipe id: {s}")))
        })
        .collect()
}

#[instrument(skip(state))]
pub async fn search_recipes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<RecipeSearchResponse>>, AppError> {
    if params.query.trim().is_empty() {
        return Err(AppError::BadRequest("Query parameter is required".into()));
    }
    let number = params.number.clamp(1, 100);
    match state.recipes.search(&params.query, number).await {
        Some(res) => Ok(ok(res)),
        None => Err(AppError::internal(
            "Failed to search recipes",
            anyhow::anyhow!("recipe search returned nothing for {:?}", params.query),
        )),
    }
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RecipeInformation>>, AppError> {
    match state.recipes.information(id).await {
        Some(info) => Ok(ok(info)),
        None => {
            warn!(recipe_id = id, "recipe unavailable");
            Err(AppError::NotFound("Recipe not found".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn recipes_by_ids(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<IdsParams>,
) -> Result<Json<ApiResponse<Vec<RecipeInformation>>>, AppError> {
    let ids = parse_ids(&params.ids)?;
    Ok(ok(state.recipes.by_ids(&ids).await))
}
