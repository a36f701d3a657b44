use async_trait::async_trait;
use tracing::{debug, error, instrument};

use super::{NutritionData, NutritionProvider, OneOrMany};
use crate::error::UpstreamError;

const SERVICE: &str = "CalorieNinjas";

/// API Ninjas nutrition endpoint. Returns one entry per food it recognizes
/// in the free-text query.
pub struct CalorieNinjasClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CalorieNinjasClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl NutritionProvider for CalorieNinjasClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<NutritionData>, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredentials(SERVICE))?;

        let res = self
            .http
            .get(format!("{}/v1/nutrition", self.base_url))
            .query(&[("query", query)])
            .header("X-Api-Key", api_key)
            .send()
            .await
            .map_err(UpstreamError::request(SERVICE))?;

        let status = res.status();
        let body = res.text().await.map_err(UpstreamError::request(SERVICE))?;
        if !status.is_success() {
            return Err(UpstreamError::status(SERVICE, status, &body));
        }

        let items: OneOrMany<NutritionData> = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "unexpected nutrition response structure");
            UpstreamError::malformed(SERVICE, e)
        })?;
        let items: Vec<NutritionData> = items.into();
        debug!(count = items.len(), "nutrition items received");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_array_and_sanitizes_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/nutrition"))
            .and(query_param("query", "1 banana"))
            .and(header("X-Api-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "banana",
                "calories": 89.4,
                "serving_size_g": "100",
                "fat_total_g": 0.3,
                "fat_saturated_g": 0.1,
                "protein_g": "Only available for premium subscribers.",
                "sodium_mg": 1,
                "potassium_mg": 22,
                "cholesterol_mg": 0,
                "carbohydrates_total_g": 23.2,
                "fiber_g": 2.6,
                "sugar_g": 12.3
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = CalorieNinjasClient::new(reqwest::Client::new(), &server.uri(), Some("secret".into()));
        let items = client.search("1 banana").await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "banana");
        assert_eq!(items[0].serving_size_g, 100.0);
        assert_eq!(items[0].protein_g, 0.0);
        assert_eq!(items[0].potassium_mg, Some(22.0));
    }

    #[tokio::test]
    async fn single_object_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/nutrition"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"name": "egg", "calories": 78})),
            )
            .mount(&server)
            .await;

        let client = CalorieNinjasClient::new(reqwest::Client::new(), &server.uri(), Some("k".into()));
        let items = client.search("egg").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].calories, 78.0);
    }

    #[tokio::test]
    async fn unexpected_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/nutrition"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": "nope"})))
            .mount(&server)
            .await;

        let client = CalorieNinjasClient::new(reqwest::Client::new(), &server.uri(), Some("k".into()));
        let err = client.search("egg").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed { .. }));
    }

    #[tokio::test]
    async fn server_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let client = CalorieNinjasClient::new(reqwest::Client::new(), &server.uri(), Some("k".into()));
        let err = client.search("egg").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { .. }));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = CalorieNinjasClient::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
        let err = client.search("egg").await.unwrap_err();
        assert!(matches!(err, UpstreamError::MissingCredentials("CalorieNinjas")));
    }
}
