mod handlers;
pub mod service;
pub mod spoonacular;
pub mod store;
pub mod types;

use async_trait::async_trait;
use axum::Router;

use crate::error::UpstreamError;
use crate::state::AppState;

pub use service::RecipeService;
pub use spoonacular::SpoonacularClient;
pub use store::{PgRecipeStore, RecipeStore, StoredRecipe};
pub use types::{RecipeInformation, RecipeSearchResponse, RecipeSearchResult};

#[async_trait]
pub trait RecipeProvider: Send + Sync {
    async fn search(&self, query: &str, number: u32) -> Result<RecipeSearchResponse, UpstreamError>;
    async fn information(&self, id: i64) -> Result<RecipeInformation, UpstreamError>;
}

pub fn router() -> Router<AppState> {
    handlers::routes()
}
