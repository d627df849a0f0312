//! HTTP implementation of the hotel provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::config::UpstreamConfig;
use super::pagination::PageRequest;
use super::token::{AccessToken, ClientCredentialsProvider};
use super::types::{CatalogPage, DataEnvelope, HotelRatingsData, HotelSearchData};
use super::{HotelApi, UpstreamError};

/// Client for the provider's catalog, search, and sentiment endpoints.
pub struct AmadeusClient {
    config: UpstreamConfig,
    client: Client,
}

impl AmadeusClient {
    pub fn new(config: UpstreamConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Token provider sharing this client's connection pool.
    ///
    /// Returns `None` when no credentials are configured.
    pub fn token_provider(&self) -> Option<ClientCredentialsProvider> {
        let (id, secret) = self.config.credentials()?;
        Some(ClientCredentialsProvider::new(
            self.client.clone(),
            self.config.token_url(),
            id.to_string(),
            secret.to_string(),
        ))
    }

    fn catalog_url(&self, city_code: &str, request: &PageRequest) -> Result<Url, UpstreamError> {
        if let PageRequest::Link(link) = request {
            return Url::parse(link).map_err(|e| UpstreamError::Decode(format!("bad next link: {}", e)));
        }

        let mut url = Url::parse(&self.config.hotel_list_url())
            .map_err(|e| UpstreamError::Transport(format!("bad hotel list URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("cityCode", city_code)
                .append_pair("radius", &self.config.radius.to_string())
                .append_pair("radiusUnit", &self.config.radius_unit);
            if let PageRequest::Offset { offset, limit } = request {
                query
                    .append_pair("page[offset]", &offset.to_string())
                    .append_pair("page[limit]", &limit.to_string());
            }
        }
        Ok(url)
    }

    fn hotel_url(base: &str, hotel_id: &str) -> Result<Url, UpstreamError> {
        let mut url =
            Url::parse(base).map_err(|e| UpstreamError::Transport(format!("bad URL {}: {}", base, e)))?;
        url.query_pairs_mut().append_pair("hotelIds", hotel_id);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, token: &AccessToken) -> Result<T, UpstreamError> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .bearer_auth(token.value())
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        resp.json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Classify a non-success response. Rejected credentials abort a stage, so
/// they must never be mistaken for a per-hotel failure.
fn status_error(status: StatusCode, body: String) -> UpstreamError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            UpstreamError::Auth(format!("HTTP {}: {}", status, body))
        }
        _ => UpstreamError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl HotelApi for AmadeusClient {
    async fn fetch_catalog_page(
        &self,
        token: &AccessToken,
        city_code: &str,
        request: &PageRequest,
    ) -> Result<CatalogPage, UpstreamError> {
        let url = self.catalog_url(city_code, request)?;
        self.get_json(url, token).await
    }

    async fn fetch_search_detail(
        &self,
        token: &AccessToken,
        hotel_id: &str,
    ) -> Result<HotelSearchData, UpstreamError> {
        let url = Self::hotel_url(&self.config.hotel_search_url(), hotel_id)?;
        let envelope: DataEnvelope<HotelSearchData> = self.get_json(url, token).await?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Empty(hotel_id.to_string()))
    }

    async fn fetch_ratings_detail(
        &self,
        token: &AccessToken,
        hotel_id: &str,
    ) -> Result<HotelRatingsData, UpstreamError> {
        let url = Self::hotel_url(&self.config.hotel_ratings_url(), hotel_id)?;
        let envelope: DataEnvelope<HotelRatingsData> = self.get_json(url, token).await?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Empty(hotel_id.to_string()))
    }
}
