//! Upstream travel-data provider boundary.
//!
//! Three sub-APIs sit behind one bearer token: the catalog-by-city listing,
//! per-hotel search detail, and per-hotel sentiment ratings. The pipeline
//! talks to them through [`HotelApi`] and obtains credentials through
//! [`TokenProvider`], so tests can substitute in-memory fakes.

mod amadeus;
mod config;
mod pagination;
mod token;
mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use amadeus::AmadeusClient;
pub use config::UpstreamConfig;
pub use pagination::{next_page, PageRequest, PaginationStyle};
pub use token::{AccessToken, ClientCredentialsProvider, StageToken};
pub use types::{
    CatalogPage, GeoCode, HotelRatingsData, HotelSearchData, HotelStub, PageLinks, PageMeta,
    StubAddress, TokenResponse,
};

/// Errors raised at the provider boundary.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Token exchange failed or a call was rejected as unauthenticated.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// Successful response with no record for the requested hotel.
    #[error("no data returned for hotel {0}")]
    Empty(String),
    #[error("cancelled")]
    Cancelled,
}

impl UpstreamError {
    /// Whether a failed search-detail call should put the hotel on the denylist.
    ///
    /// Every failure that is about the hotel itself counts; credential and
    /// cancellation failures say nothing about the ID.
    pub fn is_permanent_for_search(&self) -> bool {
        !matches!(self, Self::Auth(_) | Self::Cancelled)
    }
}

/// Obtains a short-lived bearer credential via client-credentials exchange.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<AccessToken, UpstreamError>;
}

/// Hotel data sub-APIs.
#[async_trait]
pub trait HotelApi: Send + Sync {
    /// Fetch one page of the catalog for `city_code`.
    async fn fetch_catalog_page(
        &self,
        token: &AccessToken,
        city_code: &str,
        request: &PageRequest,
    ) -> Result<CatalogPage, UpstreamError>;

    /// Fetch search detail (amenities, offers) for one hotel.
    async fn fetch_search_detail(
        &self,
        token: &AccessToken,
        hotel_id: &str,
    ) -> Result<HotelSearchData, UpstreamError>;

    /// Fetch sentiment ratings for one hotel.
    async fn fetch_ratings_detail(
        &self,
        token: &AccessToken,
        hotel_id: &str,
    ) -> Result<HotelRatingsData, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_denylist_classification() {
        assert!(UpstreamError::Empty("H1".into()).is_permanent_for_search());
        assert!(UpstreamError::Status {
            status: 400,
            body: String::new()
        }
        .is_permanent_for_search());
        assert!(UpstreamError::Transport("reset".into()).is_permanent_for_search());
        assert!(!UpstreamError::Cancelled.is_permanent_for_search());
        assert!(!UpstreamError::Auth("expired".into()).is_permanent_for_search());
    }
}
