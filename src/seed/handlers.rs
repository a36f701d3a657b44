use std::collections::BTreeMap;

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use super::{seed_food_cache, SeedOutcome, COMMON_FOODS};
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SeedReport {
    pub message: &'static str,
    pub results: BTreeMap<String, SeedOutcome>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cache/seed", post(seed))
        .route("/cache/clear", post(clear))
}

#[instrument(skip(state))]
pub async fn seed(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<ApiResponse<SeedReport>>, AppError> {
    let results = seed_food_cache(&state.food_cache, &COMMON_FOODS, state.config.seed.delay).await;
    Ok(ok(SeedReport {
        message: "Seeding complete",
        results,
    }))
}

#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    state.food_cache.clear_memory().await;
    state.recipes.clear_memory().await;
    info!(user_id = %user_id, "in-process caches cleared");
    Ok(ok("Caches cleared"))
}
