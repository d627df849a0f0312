//! Bearer credentials for the provider.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::TokenResponse;
use super::{TokenProvider, UpstreamError};

/// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// A bearer token and, when the server said so, when it stops working.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Option<Instant>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, lifetime: Option<Duration>) -> Self {
        Self {
            value: value.into(),
            expires_at: lifetime.map(|d| Instant::now() + d),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Tokens without a declared lifetime never expire locally.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() + EXPIRY_SKEW >= at,
            None => false,
        }
    }
}

/// OAuth2 client-credentials exchange against a fixed token endpoint.
pub struct ClientCredentialsProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsProvider {
    pub fn new(client: Client, token_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn get_token(&self) -> Result<AccessToken, UpstreamError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let resp = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Auth(format!("malformed token response: {}", e)))?;
        if token.access_token.is_empty() {
            return Err(UpstreamError::Auth("empty access token".to_string()));
        }

        info!("OAuth2 token obtained successfully");
        Ok(AccessToken::new(
            token.access_token,
            token.expires_in.map(Duration::from_secs),
        ))
    }
}

/// The credential used for the duration of one pipeline stage.
///
/// Acquired once when the stage starts; re-acquired transparently if the
/// stage outlives the token.
#[derive(Clone)]
pub struct StageToken {
    provider: Arc<dyn TokenProvider>,
    current: Arc<Mutex<AccessToken>>,
}

impl StageToken {
    /// Obtain the stage's first token. Failure aborts the stage.
    pub async fn acquire(provider: Arc<dyn TokenProvider>) -> Result<Self, UpstreamError> {
        let token = provider.get_token().await?;
        Ok(Self {
            provider,
            current: Arc::new(Mutex::new(token)),
        })
    }

    /// A token that is valid now.
    pub async fn get(&self) -> Result<AccessToken, UpstreamError> {
        let mut current = self.current.lock().await;
        if current.is_expired() {
            debug!("Stage token expired, re-acquiring");
            *current = self.provider.get_token().await?;
        }
        Ok(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        lifetime: Option<Duration>,
    }

    #[async_trait]
    impl TokenProvider for CountingProvider {
        async fn get_token(&self) -> Result<AccessToken, UpstreamError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(format!("token-{n}"), self.lifetime))
        }
    }

    #[test]
    fn test_token_expiry() {
        assert!(!AccessToken::new("a", None).is_expired());
        assert!(!AccessToken::new("a", Some(Duration::from_secs(1799))).is_expired());
        assert!(AccessToken::new("a", Some(Duration::from_secs(5))).is_expired());
    }

    #[tokio::test]
    async fn test_stage_token_reused_while_valid() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            lifetime: Some(Duration::from_secs(1799)),
        });
        let stage = StageToken::acquire(provider.clone()).await.unwrap();

        assert_eq!(stage.get().await.unwrap().value(), "token-0");
        assert_eq!(stage.get().await.unwrap().value(), "token-0");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stage_token_reacquired_when_expired() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            lifetime: Some(Duration::from_secs(1)),
        });
        let stage = StageToken::acquire(provider.clone()).await.unwrap();

        assert_eq!(stage.get().await.unwrap().value(), "token-1");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
