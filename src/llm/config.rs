//! LLM provider configuration.

use serde::{Deserialize, Serialize};

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// OpenAI chat completions (default)
    #[default]
    OpenAI,
    /// Anthropic messages API
    Claude,
    /// xAI Grok (OpenAI-compatible)
    Grok,
}

impl LlmProviderKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "claude" | "anthropic" => Some(Self::Claude),
            "grok" | "xai" => Some(Self::Grok),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Claude => "claude",
            Self::Grok => "grok",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::Grok => "GROK_API_KEY",
        }
    }

    /// Environment variable naming this provider's model.
    pub fn model_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_MODEL",
            Self::Claude => "CLAUDE_MODEL",
            Self::Grok => "GROK_MODEL",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4",
            Self::Claude => "claude-3-opus-20240229",
            Self::Grok => "grok-beta",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com",
            Self::Claude => "https://api.anthropic.com",
            Self::Grok => "https://api.x.ai",
        }
    }
}

/// Configuration for the analysis LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,
    /// Model override; defaults per provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Endpoint override; defaults per provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key; normally taken from the provider's env var.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl LlmConfig {
    fn base_default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            model: None,
            endpoint: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_PROVIDER`: "openai" (default), "claude", or "grok"
    /// - `LLM_ENDPOINT`: API base URL
    ///
    /// Provider-specific keys and models (`OPENAI_API_KEY`, `CLAUDE_MODEL`,
    /// ...) are resolved when the provider is built, so a provider chosen in
    /// the config file still picks up its own env vars.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("LLM_PROVIDER") {
            if let Some(provider) = LlmProviderKind::from_str(&val) {
                self.provider = provider;
            }
        }
        if let Ok(val) = std::env::var("LLM_ENDPOINT") {
            self.endpoint = Some(val);
        }
        self
    }

    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .or_else(|| std::env::var(self.provider.model_env()).ok())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.provider.api_key_env()).ok())
            .filter(|k| !k.is_empty())
    }

    pub fn resolved_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.provider.default_endpoint().to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(LlmProviderKind::from_str("OpenAI"), Some(LlmProviderKind::OpenAI));
        assert_eq!(LlmProviderKind::from_str("anthropic"), Some(LlmProviderKind::Claude));
        assert_eq!(LlmProviderKind::from_str("grok"), Some(LlmProviderKind::Grok));
        assert_eq!(LlmProviderKind::from_str("ollama"), None);
    }

    #[test]
    fn test_explicit_values_win() {
        let mut config = LlmConfig::base_default();
        config.provider = LlmProviderKind::Grok;
        config.model = Some("grok-2".to_string());
        config.api_key = Some("key".to_string());
        config.endpoint = Some("https://proxy.test/".to_string());

        assert_eq!(config.resolved_model(), "grok-2");
        assert_eq!(config.resolved_api_key().as_deref(), Some("key"));
        assert_eq!(config.resolved_endpoint(), "https://proxy.test");
    }

    #[test]
    fn test_provider_serde_names() {
        let config: LlmConfig = toml::from_str("provider = \"claude\"").unwrap();
        assert_eq!(config.provider, LlmProviderKind::Claude);
        assert_eq!(config.max_tokens, 500);

        let config: LlmConfig = toml::from_str("provider = \"openai\"").unwrap();
        assert_eq!(config.provider, LlmProviderKind::OpenAI);
    }
}
