//! Pluggable third-party review sources.

mod aggregator;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Hotel, HotelReview, ReviewSourceKind};

pub use aggregator::ReviewAggregator;

#[derive(Debug, Error)]
pub enum ReviewSourceError {
    /// No crawler exists for this site yet.
    #[error("review source {0} is not supported")]
    NotSupported(ReviewSourceKind),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("cancelled")]
    Cancelled,
}

/// A site that can be crawled for reviews of one hotel.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    fn kind(&self) -> ReviewSourceKind;

    fn source_name(&self) -> &'static str {
        self.kind().as_str()
    }

    async fn crawl(&self, hotel: &Hotel) -> Result<Vec<HotelReview>, ReviewSourceError>;
}

/// Placeholder for a site without a crawler.
///
/// Reports `NotSupported` instead of an empty list so a missing crawler
/// never reads as "no reviews found".
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedSource {
    kind: ReviewSourceKind,
}

impl UnsupportedSource {
    pub fn new(kind: ReviewSourceKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl ReviewSource for UnsupportedSource {
    fn kind(&self) -> ReviewSourceKind {
        self.kind
    }

    async fn crawl(&self, _hotel: &Hotel) -> Result<Vec<HotelReview>, ReviewSourceError> {
        Err(ReviewSourceError::NotSupported(self.kind))
    }
}

/// The statically registered source list, in crawl order.
pub fn default_sources() -> Vec<Arc<dyn ReviewSource>> {
    ReviewSourceKind::ALL
        .iter()
        .map(|kind| Arc::new(UnsupportedSource::new(*kind)) as Arc<dyn ReviewSource>)
        .collect()
}
