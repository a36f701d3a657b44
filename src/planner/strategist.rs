use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::analyst::NutritionSummary;
use super::evaluator::GoalEvaluation;
use super::PipelineError;
use crate::llm::LlmHelper;

pub const SUGGESTION_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSuggestion {
    pub title: String,
    #[serde(rename = "searchQuery")]
    pub search_query: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealStrategy {
    pub analysis: String,
    pub suggestions: Vec<MealSuggestion>,
}

/// First match wins: vegan, then keto, then vegetarian.
pub fn diet_directive(diet: &[String]) -> &'static str {
    let has = |tag: &str| diet.iter().any(|d| d == tag);
    if has("vegan") {
        "STRICTLY VEGAN. No meat, dairy, eggs, or animal products."
    } else if has("keto") {
        "KETO FRIENDLY. High fat, very low carb. No sugar, grains, or starchy veg."
    } else if has("vegetarian") {
        "VEGETARIAN. No meat. Dairy and eggs are okay."
    } else {
        "No specific dietary restrictions, but focus on healthy, whole foods."
    }
}

/// Rounds for display; `-0.5..0` prints as `0`, not `-0`.
fn whole(value: f64) -> f64 {
    value.round() + 0.0
}

pub fn build_system_prompt(current: &NutritionSummary, evaluation: &GoalEvaluation) -> String {
    format!(
        r#"You are an expert meal planner. Generate 3 distinct meal suggestions based on the user's status.

Current Status:
- Consumed: {consumed} kcal
- Goal: {goal} kcal
- Remaining: {remaining} kcal
- Protein Needs: Need {protein}g more

Guidance: {guidance}
Dietary Constraints: {diet}

Return a JSON object with:
1. "analysis": A brief, encouraging 1-sentence summary of their status (e.g., "You're doing great on protein, but have 600 calories left for dinner!").
2. "suggestions": An array of 3 meal objects. Each object must have:
   - "title": A short, catchy name for the dish (e.g., "Grilled Lemon Herb Chicken").
   - "searchQuery": A specific search term to find this recipe (e.g., "lemon herb chicken breast").
   - "reasoning": Why this fits their current needs (e.g., "High protein to hit your goal, low calorie to stay within limit")."#,
        consumed = whole(current.calories),
        goal = evaluation.goals.calories,
        remaining = whole(evaluation.remaining.calories),
        protein = evaluation.remaining.protein.max(0.0).round(),
        guidance = evaluation.guidance,
        diet = diet_directive(&evaluation.goals.diet),
    )
}

/// Truncates to three suggestions; fewer, or one without a title or search
/// query, is an error.
pub fn validate(mut strategy: MealStrategy) -> Result<MealStrategy, PipelineError> {
    if strategy.suggestions.len() < SUGGESTION_COUNT {
        return Err(PipelineError::TooFewSuggestions(strategy.suggestions.len()));
    }
    if strategy.suggestions.len() > SUGGESTION_COUNT {
        warn!(count = strategy.suggestions.len(), "model returned extra suggestions, truncating");
        strategy.suggestions.truncate(SUGGESTION_COUNT);
    }
    if let Some(i) = strategy
        .suggestions
        .iter()
        .position(|s| s.title.trim().is_empty() || s.search_query.trim().is_empty())
    {
        return Err(PipelineError::IncompleteSuggestion(i));
    }
    Ok(strategy)
}

#[instrument(skip_all, fields(status = ?evaluation.status))]
pub async fn generate_strategy(
    llm: &LlmHelper,
    current: &NutritionSummary,
    evaluation: &GoalEvaluation,
) -> Result<MealStrategy, PipelineError> {
    let system = build_system_prompt(current, evaluation);
    let strategy: MealStrategy = llm.generate_json("Generate meal plan", Some(&system)).await?;
    validate(strategy)
}
