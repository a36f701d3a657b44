//! AI meal planning: a fixed, sequential four-stage pipeline.
//!
//! 1. [`analyst`] sums today's food logs.
//! 2. [`evaluator`] compares them with the profile goals.
//! 3. [`strategist`] asks the model for three meal ideas.
//! 4. [`recommender`] attaches a recipe to each idea.
//!
//! Any stage error aborts the run; saving the finished plan is best-effort.

pub mod analyst;
pub mod evaluator;
mod handlers;
pub mod pipeline;
pub mod recommender;
pub mod store;
pub mod strategist;

use axum::Router;
use thiserror::Error;

use crate::llm::LlmError;
use crate::state::AppState;

pub use pipeline::{MealPlanPipeline, MealPlanResult};
pub use store::{MealPlan, PgPlannerStore, PlannerStore};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("loading planner inputs failed: {0:#}")]
    Store(#[from] anyhow::Error),
    #[error("meal planner model call failed: {0}")]
    Llm(#[from] LlmError),
    #[error("meal planner returned {0} suggestions, expected 3")]
    TooFewSuggestions(usize),
    #[error("meal suggestion {0} has no title or search query")]
    IncompleteSuggestion(usize),
}

pub fn router() -> Router<AppState> {
    handlers::routes()
}
