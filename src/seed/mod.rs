//! Warms the food search cache with common foods, one upstream call at a
//! time.

mod handlers;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::cache::FoodSearchCache;
use crate::state::AppState;
use axum::Router;

pub const COMMON_FOODS: [&str; 33] = [
    // proteins
    "chicken breast",
    "ground beef",
    "salmon fillet",
    "tuna canned",
    "egg",
    "tofu",
    "greek yogurt",
    // carbs
    "white rice",
    "brown rice",
    "oats",
    "sweet potato",
    "potato",
    "pasta",
    "whole wheat bread",
    "quinoa",
    // fruit
    "banana",
    "apple",
    "orange",
    "avocado",
    "blueberries",
    "strawberries",
    // vegetables
    "broccoli",
    "spinach",
    "carrot",
    "onion",
    "tomato",
    "bell pepper",
    "cucumber",
    // drinks
    "coffee",
    "black tea",
    "milk",
    "orange juice",
    "coke",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Refreshes each food in order, sleeping `delay` after every successful
/// upstream call to stay under provider rate limits.
#[instrument(skip(cache, foods), fields(foods = foods.len()))]
pub async fn seed_food_cache(
    cache: &FoodSearchCache,
    foods: &[&str],
    delay: Duration,
) -> BTreeMap<String, SeedOutcome> {
    let mut results = BTreeMap::new();
    for &food in foods {
        info!(food, "seeding");
        let outcome = match cache.refresh(food).await {
            Ok(items) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                SeedOutcome {
                    success: true,
                    count: Some(items.len()),
                    error: None,
                }
            }
            Err(e) => {
                error!(food, error = %e, "failed to seed");
                SeedOutcome {
                    success: false,
                    count: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.insert(food.to_string(), outcome);
    }
    let seeded = results.values().filter(|o| o.success).count();
    info!(seeded, total = foods.len(), "seeding complete");
    results
}

pub fn router() -> Router<AppState> {
    handlers::routes()
}
