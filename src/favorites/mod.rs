mod dto;
mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo_types::{FavoriteFood, FavoriteRecipe};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
