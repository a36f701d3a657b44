use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ChatMessage, CompletionRequest, CompletionResponse, LlmClient, LlmError, TokenUsage};
use crate::config::LlmConfig;
use crate::error::UpstreamError;

const SERVICE: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    config: LlmConfig,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

impl AnthropicClient {
    pub fn new(http: reqwest::Client, config: LlmConfig) -> Self {
        Self {
            http,
            config,
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredentials(SERVICE))?;

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            system: request.system.as_deref(),
            messages: &request.messages,
        };

        let res = self
            .http
            .post(format!(
                "{}/v1/messages",
                self.config.base_url.trim_end_matches('/')
            ))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::request(SERVICE))?;

        let status = res.status();
        let raw = res.text().await.map_err(UpstreamError::request(SERVICE))?;
        if !status.is_success() {
            return Err(UpstreamError::status(SERVICE, status, &raw).into());
        }
        let parsed: MessagesResponse =
            serde_json::from_str(&raw).map_err(|e| UpstreamError::malformed(SERVICE, e))?;

        let usage = TokenUsage {
            input: parsed.usage.input_tokens,
            output: parsed.usage.output_tokens,
            total: parsed.usage.input_tokens + parsed.usage.output_tokens,
        };
        self.input_tokens.fetch_add(usage.input, Ordering::Relaxed);
        self.output_tokens.fetch_add(usage.output, Ordering::Relaxed);
        debug!(input = usage.input, output = usage.output, "completion done");

        // Only the first block is read; non-text blocks yield an empty reply.
        let text = match parsed.content.into_iter().next() {
            Some(ContentBlock::Text { text }) => text,
            _ => String::new(),
        };
        Ok(CompletionResponse { text, usage })
    }

    fn usage(&self) -> TokenUsage {
        let input = self.input_tokens.load(Ordering::Relaxed);
        let output = self.output_tokens.load(Ordering::Relaxed);
        TokenUsage {
            input,
            output,
            total: input + output,
        }
    }
}
