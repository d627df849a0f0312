//! OpenAI-compatible chat completions (OpenAI and Grok).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{LlmConfig, LlmProviderKind};
use super::prompts::{quality_prompt, quiet_prompt};
use super::{parse_quality, parse_quiet, LlmError, LlmProvider, QualityAnalysis, QuietAnalysis};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Provider speaking the `/v1/chat/completions` protocol.
pub struct ChatCompletionsProvider {
    kind: LlmProviderKind,
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            kind: config.provider,
            client,
            endpoint: config.resolved_endpoint(),
            api_key: config.resolved_api_key(),
            model: config.resolved_model(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey(self.kind.as_str(), self.kind.api_key_env()))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.endpoint);
        debug!("POST {} (model {})", url, self.model);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("no choices in response".to_string()))
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    async fn analyze_quality(&self, reviews: &[String]) -> Result<QualityAnalysis, LlmError> {
        let content = self.complete(&quality_prompt(reviews)).await?;
        parse_quality(&content)
    }

    async fn analyze_quiet(&self, reviews: &[String]) -> Result<QuietAnalysis, LlmError> {
        let content = self.complete(&quiet_prompt(reviews)).await?;
        parse_quiet(&content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
