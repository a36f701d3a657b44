use std::time::{Duration, Instant};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

use super::{NutritionData, NutritionProvider, OneOrMany};
use crate::error::UpstreamError;

const SERVICE: &str = "FatSecret";
const DEFAULT_SERVING_G: f64 = 100.0;
/// Tokens are refreshed this long before they actually expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Option<FoodsPage>,
}

#[derive(Debug, Deserialize)]
struct FoodsPage {
    #[serde(default)]
    food: Option<OneOrMany<FatSecretFood>>,
}

#[derive(Debug, Deserialize)]
struct FatSecretFood {
    food_name: String,
    #[serde(default)]
    food_description: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// FatSecret Platform client (OAuth2 client credentials).
pub struct FatSecretClient {
    http: reqwest::Client,
    token_url: String,
    api_url: String,
    credentials: Option<(String, String)>,
    token: Mutex<Option<CachedToken>>,
}

impl FatSecretClient {
    pub fn new(
        http: reqwest::Client,
        token_url: &str,
        api_url: &str,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.to_string(),
            api_url: api_url.to_string(),
            credentials: client_id.zip(client_secret),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, UpstreamError> {
        let (client_id, client_secret) = self
            .credentials
            .as_ref()
            .ok_or(UpstreamError::MissingCredentials(SERVICE))?;

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let res = self
            .http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body("grant_type=client_credentials&scope=basic")
            .send()
            .await
            .map_err(UpstreamError::request(SERVICE))?;

        let status = res.status();
        let body = res.text().await.map_err(UpstreamError::request(SERVICE))?;
        if !status.is_success() {
            return Err(UpstreamError::status(SERVICE, status, &body));
        }
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::malformed(SERVICE, e))?;

        debug!(expires_in = token.expires_in, "fatsecret token refreshed");
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl NutritionProvider for FatSecretClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<NutritionData>, UpstreamError> {
        let token = self.access_token().await?;

        let res = self
            .http
            .get(&self.api_url)
            .query(&[
                ("method", "foods.search"),
                ("search_expression", query),
                ("format", "json"),
            ])
            .bearer_auth(token)
            .send()
            .await
            .map_err(UpstreamError::request(SERVICE))?;

        let status = res.status();
        let body = res.text().await.map_err(UpstreamError::request(SERVICE))?;
        if !status.is_success() {
            return Err(UpstreamError::status(SERVICE, status, &body));
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::malformed(SERVICE, e))?;
        if let Some(api_error) = value.get("error") {
            error!(error = %api_error, "fatsecret api returned error");
            return Err(UpstreamError::malformed(SERVICE, api_error));
        }
        let parsed: SearchResponse = serde_json::from_value(value).map_err(|e| {
            error!(error = %e, "unexpected fatsecret response structure");
            UpstreamError::malformed(SERVICE, e)
        })?;

        let foods: Vec<FatSecretFood> = parsed
            .foods
            .and_then(|page| page.food)
            .map(Vec::from)
            .unwrap_or_default();

        Ok(foods.into_iter().map(to_nutrition).collect())
    }
}

fn to_nutrition(food: FatSecretFood) -> NutritionData {
    let parsed = parse_description(&food.food_description);
    NutritionData {
        name: food.food_name,
        calories: parsed.calories,
        serving_size_g: parsed.serving_size_g,
        serving_unit: parsed.serving_unit,
        protein_g: parsed.protein_g,
        carbohydrates_total_g: parsed.carbs_g,
        fat_total_g: parsed.fat_g,
        sugar_g: None,
        fiber_g: None,
        sodium_mg: None,
        potassium_mg: None,
        cholesterol_mg: None,
        fat_saturated_g: None,
    }
}

#[derive(Debug, PartialEq)]
struct ParsedDescription {
    serving_unit: Option<String>,
    serving_size_g: f64,
    calories: f64,
    fat_g: f64,
    carbs_g: f64,
    protein_g: f64,
}

/// Parses summaries such as
/// `"Per 1 medium (182g) - Calories: 95kcal | Fat: 0.31g | Carbs: 25.13g | Protein: 0.47g"`.
fn parse_description(description: &str) -> ParsedDescription {
    lazy_static! {
        static ref GRAMS: Regex = Regex::new(r"(\d+(?:\.\d+)?)g").unwrap();
        static ref CALORIES: Regex = Regex::new(r"Calories:\s*(\d+(?:\.\d+)?)").unwrap();
        static ref FAT: Regex = Regex::new(r"Fat:\s*(\d+(?:\.\d+)?)").unwrap();
        static ref CARBS: Regex = Regex::new(r"Carbs:\s*(\d+(?:\.\d+)?)").unwrap();
        static ref PROTEIN: Regex = Regex::new(r"Protein:\s*(\d+(?:\.\d+)?)").unwrap();
    }

    let (serving, nutrition) = description.split_once(" - ").unwrap_or((description, ""));
    let serving = serving.trim();
    let serving = serving.strip_prefix("Per ").unwrap_or(serving);

    let capture = |re: &Regex, text: &str| -> Option<f64> {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    };

    ParsedDescription {
        serving_unit: (!serving.is_empty()).then(|| serving.to_string()),
        serving_size_g: capture(&GRAMS, serving).unwrap_or(DEFAULT_SERVING_G),
        calories: capture(&CALORIES, nutrition).unwrap_or(0.0),
        fat_g: capture(&FAT, nutrition).unwrap_or(0.0),
        carbs_g: capture(&CARBS, nutrition).unwrap_or(0.0),
        protein_g: capture(&PROTEIN, nutrition).unwrap_or(0.0),
    }
}
