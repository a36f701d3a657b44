//! Conversational nutrition assistant grounded in the user's own data.

pub mod context;
mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
