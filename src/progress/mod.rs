mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo_types::UserProgress;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
