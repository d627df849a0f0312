//! Fan-out over review sources with per-source politeness delay.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{ReviewSource, ReviewSourceError};
use crate::error::PipelineError;
use crate::models::Hotel;
use crate::repository::{DieselError, DieselReviewRepository};
use crate::utils::{sleep_or_cancel, until_cancelled};

/// Crawls every registered source for a hotel and stores what comes back.
///
/// The only writer of `hotel_reviews`.
#[derive(Clone)]
pub struct ReviewAggregator {
    sources: Vec<Arc<dyn ReviewSource>>,
    reviews: DieselReviewRepository,
    source_delay: Duration,
}

impl ReviewAggregator {
    pub fn new(
        sources: Vec<Arc<dyn ReviewSource>>,
        reviews: DieselReviewRepository,
        source_delay: Duration,
    ) -> Self {
        Self {
            sources,
            reviews,
            source_delay,
        }
    }

    /// Crawl all sources in order, returning how many reviews were written.
    ///
    /// Source and persistence failures are logged and skipped. Only
    /// cancellation ends the crawl early.
    pub async fn crawl_all_sources(
        &self,
        cancel: &CancellationToken,
        hotel: &Hotel,
    ) -> Result<usize, PipelineError> {
        let mut written = 0usize;

        for (idx, source) in self.sources.iter().enumerate() {
            let name = source.source_name();
            let result = until_cancelled(cancel, source.crawl(hotel))
                .await
                .unwrap_or(Err(ReviewSourceError::Cancelled));
            // Unsupported sources never reach the network, so they earn no pause.
            let contacted = !matches!(result, Err(ReviewSourceError::NotSupported(_)));

            match result {
                Ok(reviews) => {
                    debug!("{}: {} reviews for {}", name, reviews.len(), hotel.hotel_id);
                    for review in &reviews {
                        match self.reviews.save(review).await {
                            Ok(()) => written += 1,
                            Err(e) => warn!(
                                "Failed to save {} review {} for {}: {}",
                                name, review.source_review_id, hotel.hotel_id, e
                            ),
                        }
                    }
                }
                Err(ReviewSourceError::Cancelled) => return Err(PipelineError::Cancelled),
                Err(ReviewSourceError::NotSupported(_)) => {
                    debug!("Skipping {} for {}: not supported", name, hotel.hotel_id);
                }
                Err(e) => warn!("Crawl of {} failed for {}: {}", name, hotel.hotel_id, e),
            }

            let is_last = idx + 1 == self.sources.len();
            if contacted && !is_last && !sleep_or_cancel(cancel, self.source_delay).await {
                return Err(PipelineError::Cancelled);
            }
        }

        if written > 0 {
            info!("Stored {} reviews for {}", written, hotel.hotel_id);
        }
        Ok(written)
    }

    /// Non-blank review texts for a hotel, most recent first.
    pub async fn get_review_texts(&self, hotel_id: &str) -> Result<Vec<String>, DieselError> {
        self.reviews.review_texts(hotel_id).await
    }
}
