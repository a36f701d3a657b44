use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ToggleRecipeRequest {
    pub title: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleRecipeResponse {
    pub recipe_id: i64,
    pub favorited: bool,
}
