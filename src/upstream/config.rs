//! Provider endpoint and credential configuration.

use serde::{Deserialize, Serialize};

use super::pagination::PaginationStyle;

/// Configuration for the upstream hotel provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL that endpoint defaults are derived from.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// OAuth2 client id (env `AMD`).
    #[serde(default, skip_serializing)]
    pub client_id: Option<String>,
    /// OAuth2 client secret (env `AMS`).
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_list_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_search_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_ratings_url: Option<String>,
    /// Catalog search radius around the city center.
    #[serde(default = "default_radius")]
    pub radius: u32,
    /// Unit for `radius` ("MILE" or "KM").
    #[serde(default = "default_radius_unit")]
    pub radius_unit: String,
    #[serde(default)]
    pub pagination: PaginationStyle,
    /// Records per page; also the short-page threshold.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_radius() -> u32 {
    100
}

fn default_radius_unit() -> String {
    "MILE".to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl UpstreamConfig {
    fn base_default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: None,
            client_secret: None,
            token_url: None,
            hotel_list_url: None,
            hotel_search_url: None,
            hotel_ratings_url: None,
            radius: default_radius(),
            radius_unit: default_radius_unit(),
            pagination: PaginationStyle::default(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `AMD` / `AMS`: client id and secret
    /// - `AMADEUS_BASE_URL`
    /// - `AMADEUS_HOTEL_LIST_URL`, `AMADEUS_HOTEL_SEARCH_URL`, `AMADEUS_HOTEL_RATINGS_URL`
    /// - `HOTEL_SEARCH_RADIUS`, `HOTEL_SEARCH_RADIUS_UNIT`
    /// - `HOTEL_LIST_PAGINATION`: "next_link" or "offset"
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("AMD") {
            self.client_id = Some(val);
        }
        if let Ok(val) = std::env::var("AMS") {
            self.client_secret = Some(val);
        }
        if let Ok(val) = std::env::var("AMADEUS_BASE_URL") {
            self.base_url = val.trim_end_matches('/').to_string();
        }
        if let Ok(val) = std::env::var("AMADEUS_HOTEL_LIST_URL") {
            self.hotel_list_url = Some(val);
        }
        if let Ok(val) = std::env::var("AMADEUS_HOTEL_SEARCH_URL") {
            self.hotel_search_url = Some(val);
        }
        if let Ok(val) = std::env::var("AMADEUS_HOTEL_RATINGS_URL") {
            self.hotel_ratings_url = Some(val);
        }
        if let Ok(val) = std::env::var("HOTEL_SEARCH_RADIUS") {
            if let Ok(n) = val.parse() {
                self.radius = n;
            }
        }
        if let Ok(val) = std::env::var("HOTEL_SEARCH_RADIUS_UNIT") {
            self.radius_unit = val;
        }
        if let Ok(val) = std::env::var("HOTEL_LIST_PAGINATION") {
            if let Some(style) = PaginationStyle::from_str(&val) {
                self.pagination = style;
            }
        }
        self
    }

    /// Credentials ship with the environment, not the config file.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }

    pub fn token_url(&self) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| format!("{}/v1/security/oauth2/token", self.base_url))
    }

    pub fn hotel_list_url(&self) -> String {
        self.hotel_list_url
            .clone()
            .unwrap_or_else(|| format!("{}/v1/reference-data/locations/hotels/by-city", self.base_url))
    }

    pub fn hotel_search_url(&self) -> String {
        self.hotel_search_url
            .clone()
            .unwrap_or_else(|| format!("{}/v2/shopping/hotel-offers", self.base_url))
    }

    pub fn hotel_ratings_url(&self) -> String {
        self.hotel_ratings_url
            .clone()
            .unwrap_or_else(|| format!("{}/v2/e-reputation/hotel-sentiments", self.base_url))
    }
}
