//! Anthropic messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::LlmConfig;
use super::prompts::{quality_prompt, quiet_prompt};
use super::{parse_quality, parse_quiet, LlmError, LlmProvider, QualityAnalysis, QuietAnalysis};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks.
    fn text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

pub struct ClaudeProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ClaudeProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
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
            .ok_or(LlmError::MissingApiKey("claude", "ANTHROPIC_API_KEY"))?;

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.endpoint);
        debug!("POST {} (model {})", url, self.model);
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let messages: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        messages
            .text()
            .ok_or_else(|| LlmError::Parse("no text content in response".to_string()))
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_blocks_joined() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "{\"a\":"}, {"type": "tool_use", "id": "t"}, {"type": "text", "text": "1}"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_empty_content() {
        let resp: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(resp.text().is_none());
    }
}
