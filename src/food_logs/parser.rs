use serde::Deserialize;
use tracing::{info, instrument};

use crate::llm::{LlmError, LlmHelper};
use crate::nutrition::NutritionData;

const SYSTEM_PROMPT: &str =
    "You are a nutrition expert who turns meal descriptions into structured nutrition data. Respond with JSON only.";

#[derive(Debug, Deserialize)]
struct ParsedMeal {
    #[serde(default)]
    items: Vec<NutritionData>,
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"Extract every food item from the meal description below and estimate its nutrition.

Rules:
- If a quantity is not given, infer a realistic single portion.
- Return one item per distinct food; do not merge foods.
- "serving_unit" is a short human label such as "1 cup", "2 slices" or "1 medium".
- "serving_size_g" is the estimated weight of that serving in grams.
- All nutrient values are numbers for the whole serving, never strings or ranges.

Return a JSON object with exactly this shape:
{{"items": [{{"name": string, "calories": number, "serving_size_g": number, "serving_unit": string, "protein_g": number, "carbohydrates_total_g": number, "fat_total_g": number, "sugar_g": number, "fiber_g": number, "sodium_mg": number}}]}}

Meal description: {text}"#
    )
}

/// One model call; no retry.
#[instrument(skip_all, fields(len = text.len()))]
pub async fn parse_meal_text(llm: &LlmHelper, text: &str) -> Result<Vec<NutritionData>, LlmError> {
    let parsed: ParsedMeal = llm.generate_json(&build_prompt(text), Some(SYSTEM_PROMPT)).await?;
    info!(items = parsed.items.len(), "meal text parsed");
    Ok(parsed.items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;
    use std::sync::Arc;

    #[tokio::test]
    async fn items_are_extracted_with_lenient_numbers() {
        let llm = Arc::new(ScriptedLlm::replying([r#"Here you go:
```json
{"items": [
  {"name": "scrambled eggs", "calories": 182, "serving_size_g": 122, "serving_unit": "2 eggs", "protein_g": 12.2, "carbohydrates_total_g": "1.6", "fat_total_g": 13.4},
  {"name": "toast", "calories": "79", "serving_size_g": 30, "serving_unit": "1 slice", "protein_g": 2.7, "carbohydrates_total_g": 14.7, "fat_total_g": 1}
]}
```"#]));
        let helper = LlmHelper::new(llm.clone());

        let items = parse_meal_text(&helper, "two scrambled eggs and a slice of toast")
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].carbohydrates_total_g, 1.6);
        assert_eq!(items[1].calories, 79.0);
        assert_eq!(items[1].serving_unit.as_deref(), Some("1 slice"));

        let request = &llm.requests()[0];
        assert_eq!(request.system.as_deref(), Some(SYSTEM_PROMPT));
        assert!(request.messages[0]
            .content
            .ends_with("Meal description: two scrambled eggs and a slice of toast"));
    }

    #[tokio::test]
    async fn prose_reply_is_an_error() {
        let helper = LlmHelper::new(Arc::new(ScriptedLlm::replying(["I'm not sure what you ate."])));
        assert!(parse_meal_text(&helper, "stuff").await.is_err());
    }
}
