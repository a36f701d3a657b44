//! Language-model access for the meal planner, the meal parser and chat.
//!
//! [`LlmClient`] is the transport seam; [`LlmHelper`] wraps one client with
//! the JSON-extraction and plain-text helpers the handlers use.

pub mod anthropic;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, instrument};

use crate::error::UpstreamError;

pub use anthropic::AnthropicClient;

const DEFAULT_JSON_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant that outputs only valid JSON.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
    /// `None` uses the client's configured temperature.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            system: None,
            messages,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: Option<&str>) -> Self {
        self.system = system.map(str::to_string);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("no JSON object found in model response")]
    NoJson,
    #[error("model returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Cumulative usage since the client was created.
    fn usage(&self) -> TokenUsage {
        TokenUsage::default()
    }
}

/// Slice from the first `{` to the last `}`; tolerates prose and code fences
/// around the object.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

pub struct LlmHelper {
    client: Arc<dyn LlmClient>,
}

impl LlmHelper {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Single-turn call at temperature 0, parsed as `T`.
    #[instrument(skip_all)]
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<T, LlmError> {
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_system(Some(system.unwrap_or(DEFAULT_JSON_SYSTEM_PROMPT)))
            .with_temperature(0.0);
        let res = self.client.complete(&request).await?;

        let Some(json) = extract_json(&res.text) else {
            error!(raw = %res.text, "no JSON object in model response");
            return Err(LlmError::NoJson);
        };
        serde_json::from_str(json).map_err(|e| {
            error!(error = %e, raw = %res.text, "model JSON did not parse");
            LlmError::from(e)
        })
    }

    #[instrument(skip_all)]
    pub async fn ask(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        self.chat(vec![ChatMessage::user(prompt)], system).await
    }

    #[instrument(skip_all, fields(turns = messages.len()))]
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        system: Option<&str>,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest::new(messages).with_system(system);
        Ok(self.client.complete(&request).await?.text)
    }

    pub fn usage(&self) -> TokenUsage {
        self.client.usage()
    }
}
