//! Nutrition lookups against third-party food databases.
//!
//! Both supported providers normalize their payloads into [`NutritionData`],
//! so the food cache does not care which one is configured.

pub mod calorie_ninjas;
pub mod fatsecret;
pub(crate) mod lenient;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{NutritionConfig, NutritionProviderKind};
use crate::error::UpstreamError;

pub use calorie_ninjas::CalorieNinjasClient;
pub use fatsecret::FatSecretClient;

/// Nutrition profile of one food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionData {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub serving_size_g: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub protein_g: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub carbohydrates_total_g: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub fat_total_g: f64,
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub sugar_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub sodium_mg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub potassium_mg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub cholesterol_mg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    pub fat_saturated_g: Option<f64>,
}

/// Upstream APIs sometimes return a bare object where a list is expected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[async_trait]
pub trait NutritionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<Vec<NutritionData>, UpstreamError>;
}

pub fn build_provider(config: &NutritionConfig, http: reqwest::Client) -> Arc<dyn NutritionProvider> {
    match config.provider {
        NutritionProviderKind::FatSecret => Arc::new(FatSecretClient::new(
            http,
            &config.fatsecret_token_url,
            &config.fatsecret_api_url,
            config.fatsecret_client_id.clone(),
            config.fatsecret_client_secret.clone(),
        )),
        NutritionProviderKind::CalorieNinjas => Arc::new(CalorieNinjasClient::new(
            http,
            &config.calorie_ninjas_base_url,
            config.calorie_ninjas_api_key.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_garbage_numbers_are_tolerated() {
        let item: NutritionData = serde_json::from_value(json!({
            "name": "apple",
            "calories": "52.1",
            "serving_size_g": 100,
            "protein_g": "Only available for premium subscribers.",
            "carbohydrates_total_g": null,
            "sugar_g": "NaN",
            "fiber_g": 2.4
        }))
        .unwrap();

        assert_eq!(item.calories, 52.1);
        assert_eq!(item.serving_size_g, 100.0);
        assert_eq!(item.protein_g, 0.0);
        assert_eq!(item.carbohydrates_total_g, 0.0);
        assert_eq!(item.fat_total_g, 0.0);
        assert_eq!(item.sugar_g, Some(0.0));
        assert_eq!(item.fiber_g, Some(2.4));
        assert_eq!(item.sodium_mg, None);
    }

    #[test]
    fn name_is_required() {
        let res = serde_json::from_value::<NutritionData>(json!({"error": "bad key"}));
        assert!(res.is_err());
    }

    #[test]
    fn single_object_becomes_one_element() {
        let one: OneOrMany<NutritionData> =
            serde_json::from_value(json!({"name": "egg", "calories": 78})).unwrap();
        let items: Vec<NutritionData> = one.into();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "egg");

        let many: OneOrMany<NutritionData> =
            serde_json::from_value(json!([{"name": "a"}, {"name": "b"}])).unwrap();
        assert_eq!(Vec::from(many).len(), 2);
    }

    #[test]
    fn absent_micros_are_not_serialized() {
        let item: NutritionData =
            serde_json::from_value(json!({"name": "rice", "calories": 130})).unwrap();
        let out = serde_json::to_value(&item).unwrap();
        assert!(out.get("sugar_g").is_none());
        assert_eq!(out["calories"], 130.0);
    }
}
