//! LLM-backed review analysis.
//!
//! A provider answers two structured questions about a batch of review
//! texts: how good the hotel is, and how quiet it is. Three backends are
//! available: OpenAI chat completions, Grok (OpenAI-compatible), and
//! Anthropic's messages API.

mod claude;
mod config;
mod openai;
mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use claude::ClaudeProvider;
pub use config::{LlmConfig, LlmProviderKind};
pub use openai::ChatCompletionsProvider;
pub use prompts::{quality_prompt, quiet_prompt, REVIEW_SEPARATOR};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to reach the LLM service.
    #[error("connection error: {0}")]
    Connection(String),
    /// API returned a non-success status.
    #[error("API error: {0}")]
    Api(String),
    /// Response did not match the expected JSON shape.
    #[error("parse error: {0}")]
    Parse(String),
    /// No API key configured for the selected provider.
    #[error("missing API key for {0} (set {1})")]
    MissingApiKey(&'static str, &'static str),
}

/// Quality assessment of a hotel from its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAnalysis {
    pub score: f64,
    pub confidence: f64,
    pub reasoning: String,
    pub recommended: bool,
}

/// Quietness assessment of a hotel from its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuietAnalysis {
    pub score: f64,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(rename = "isQuiet")]
    pub is_quiet: bool,
}

/// A model that can score review batches.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn analyze_quality(&self, reviews: &[String]) -> Result<QualityAnalysis, LlmError>;
    async fn analyze_quiet(&self, reviews: &[String]) -> Result<QuietAnalysis, LlmError>;
    /// Model identifier recorded with each recommendation.
    fn model_name(&self) -> &str;
}

/// Build the provider selected in `config`.
pub fn build_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    match config.provider {
        LlmProviderKind::OpenAI | LlmProviderKind::Grok => {
            Arc::new(ChatCompletionsProvider::new(config))
        }
        LlmProviderKind::Claude => Arc::new(ClaudeProvider::new(config)),
    }
}

/// Parse a quality answer, rejecting anything outside the documented shape.
pub fn parse_quality(content: &str) -> Result<QualityAnalysis, LlmError> {
    let analysis: QualityAnalysis = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| LlmError::Parse(format!("quality analysis: {}", e)))?;
    check_unit_interval("quality score", analysis.score)?;
    check_unit_interval("quality confidence", analysis.confidence)?;
    Ok(analysis)
}

/// Parse a quiet answer, rejecting anything outside the documented shape.
pub fn parse_quiet(content: &str) -> Result<QuietAnalysis, LlmError> {
    let analysis: QuietAnalysis = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| LlmError::Parse(format!("quiet analysis: {}", e)))?;
    check_unit_interval("quiet score", analysis.score)?;
    check_unit_interval("quiet confidence", analysis.confidence)?;
    Ok(analysis)
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), LlmError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LlmError::Parse(format!("{} {} outside [0, 1]", field, value)))
    }
}

/// Models often wrap JSON in a markdown fence; unwrap it if present.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
