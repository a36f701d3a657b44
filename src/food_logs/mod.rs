mod dto;
mod handlers;
pub mod parser;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo_types::{FoodLog, NewFoodLog};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
