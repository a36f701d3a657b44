use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{RecipeInformation, RecipeProvider, RecipeSearchResponse};
use crate::error::UpstreamError;

const SERVICE: &str = "Spoonacular";

pub struct SpoonacularClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SpoonacularClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredentials(SERVICE))?;

        let res = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .query(&[("apiKey", api_key)])
            .send()
            .await
            .map_err(UpstreamError::request(SERVICE))?;

        let status = res.status();
        let body = res.text().await.map_err(UpstreamError::request(SERVICE))?;
        if !status.is_success() {
            return Err(UpstreamError::status(SERVICE, status, &body));
        }
        serde_json::from_str(&body).map_err(|e| UpstreamError::malformed(SERVICE, e))
    }
}

#[async_trait]
impl RecipeProvider for SpoonacularClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, number: u32) -> Result<RecipeSearchResponse, UpstreamError> {
        let res: RecipeSearchResponse = self
            .get_json(
                "/recipes/complexSearch",
                &[("query", query.to_string()), ("number", number.to_string())],
            )
            .await?;
        debug!(count = res.results.len(), total = res.total_results, "recipe search done");
        Ok(res)
    }

    #[instrument(skip(self))]
    async fn information(&self, id: i64) -> Result<RecipeInformation, UpstreamError> {
        self.get_json(&format!("/recipes/{id}/information"), &[]).await
    }
}
