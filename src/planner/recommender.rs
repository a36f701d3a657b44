use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::strategist::{MealStrategy, MealSuggestion};
use crate::recipes::{RecipeSearchResult, RecipeService};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecommendation {
    #[serde(flatten)]
    pub suggestion: MealSuggestion,
    pub recipe: Option<RecipeSearchResult>,
}

/// First three words of `query`.
pub fn simplified_query(query: &str) -> String {
    query.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}

async fn first_result(recipes: &RecipeService, query: &str) -> Option<RecipeSearchResult> {
    recipes
        .search(query, 1)
        .await
        .and_then(|res| res.results.into_iter().next())
}

async fn recommend_one(recipes: &RecipeService, suggestion: MealSuggestion) -> RecipeRecommendation {
    let mut recipe = first_result(recipes, &suggestion.search_query).await;
    if recipe.is_none() {
        let simplified = simplified_query(&suggestion.search_query);
        if simplified != suggestion.search_query.trim() {
            debug!(query = %simplified, "retrying recipe search with simplified query");
            recipe = first_result(recipes, &simplified).await;
        }
    }
    RecipeRecommendation { suggestion, recipe }
}

/// Looks up a recipe for every suggestion concurrently. Misses and failed
/// searches leave `recipe` empty.
#[instrument(skip_all, fields(suggestions = strategy.suggestions.len()))]
pub async fn find_recipes(recipes: &RecipeService, strategy: MealStrategy) -> Vec<RecipeRecommendation> {
    join_all(
        strategy
            .suggestions
            .into_iter()
            .map(|s| recommend_one(recipes, s)),
    )
    .await
}
