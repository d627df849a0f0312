//! Per-hotel search and ratings detail under a bounded worker pool.
//!
//! Each hotel is one unit of work producing a [`DetailOutcome`]; outcomes
//! are folded into a [`StageSummary`] as they complete, in any order.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::models::RatingSource;
use crate::repository::DieselHotelRepository;
use crate::upstream::{AccessToken, HotelApi, StageToken, UpstreamError};
use crate::utils::{sleep_or_cancel, until_cancelled};

/// What happened to one hotel in a detail stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    Saved,
    /// Already on the search denylist; no call made.
    Skipped,
    /// The call failed and the ID was added to the search denylist.
    Denylisted,
    Failed,
}

/// Counts for one detail stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub saved: usize,
    pub skipped: usize,
    pub denylisted: usize,
    pub failed: usize,
}

impl StageSummary {
    pub fn record(mut self, outcome: DetailOutcome) -> Self {
        match outcome {
            DetailOutcome::Saved => self.saved += 1,
            DetailOutcome::Skipped => self.skipped += 1,
            DetailOutcome::Denylisted => self.denylisted += 1,
            DetailOutcome::Failed => self.failed += 1,
        }
        self
    }

    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.denylisted + self.failed
    }
}

/// Fetches search and ratings detail for many hotels.
#[derive(Clone)]
pub struct DetailFetcher {
    api: Arc<dyn HotelApi>,
    hotels: DieselHotelRepository,
    delay: Duration,
    search_concurrency: usize,
    ratings_concurrency: usize,
}

impl DetailFetcher {
    pub fn new(
        api: Arc<dyn HotelApi>,
        hotels: DieselHotelRepository,
        delay: Duration,
        search_concurrency: usize,
        ratings_concurrency: usize,
    ) -> Self {
        Self {
            api,
            hotels,
            delay,
            search_concurrency: search_concurrency.max(1),
            ratings_concurrency: ratings_concurrency.max(1),
        }
    }

    /// Search detail for every ID, at most `search_concurrency` in flight.
    ///
    /// Denylisted IDs are skipped without a call. Any failure other than
    /// authentication puts the ID on the denylist. Authentication failure
    /// and cancellation abort the stage.
    pub async fn fetch_search_all(
        &self,
        cancel: &CancellationToken,
        hotel_ids: Vec<String>,
        token: &StageToken,
    ) -> Result<StageSummary, PipelineError> {
        let summary = stream::iter(hotel_ids)
            .map(|id| async move { self.search_one(cancel, &id, token).await })
            .buffer_unordered(self.search_concurrency)
            .try_fold(StageSummary::default(), |acc, outcome| async move {
                Ok(acc.record(outcome))
            })
            .await?;

        info!(
            "Search detail: {} saved, {} skipped, {} denylisted, {} failed",
            summary.saved, summary.skipped, summary.denylisted, summary.failed
        );
        Ok(summary)
    }

    /// Ratings detail for every ID, at most `ratings_concurrency` in flight.
    ///
    /// Failures are logged and counted; the denylist is never touched.
    pub async fn fetch_ratings_all(
        &self,
        cancel: &CancellationToken,
        hotel_ids: Vec<String>,
        token: &StageToken,
    ) -> Result<StageSummary, PipelineError> {
        let summary = stream::iter(hotel_ids)
            .map(|id| async move { self.ratings_one(cancel, &id, token).await })
            .buffer_unordered(self.ratings_concurrency)
            .try_fold(StageSummary::default(), |acc, outcome| async move {
                Ok(acc.record(outcome))
            })
            .await?;

        info!(
            "Ratings detail: {} saved, {} failed",
            summary.saved, summary.failed
        );
        Ok(summary)
    }

    async fn search_one(
        &self,
        cancel: &CancellationToken,
        hotel_id: &str,
        token: &StageToken,
    ) -> Result<DetailOutcome, PipelineError> {
        match self.hotels.is_invalid_for_search(hotel_id).await {
            Ok(true) => {
                debug!("Skipping denylisted hotel {}", hotel_id);
                return Ok(DetailOutcome::Skipped);
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Denylist lookup failed for {}: {}", hotel_id, e);
                return Ok(DetailOutcome::Failed);
            }
        }

        let access = current_token(cancel, token).await?;
        let result = until_cancelled(cancel, self.api.fetch_search_detail(&access, hotel_id))
            .await
            .ok_or(PipelineError::Cancelled)?;

        let outcome = match result {
            Ok(data) => match self.hotels.upsert_search_data(&data).await {
                Ok(()) => DetailOutcome::Saved,
                Err(e) => {
                    warn!("Failed to store search data for {}: {}", hotel_id, e);
                    DetailOutcome::Failed
                }
            },
            Err(e) => match classify_search_failure(e) {
                PipelineError::PermanentUnsupported(reason) => {
                    warn!("Search detail failed for {}, denylisting: {}", hotel_id, reason);
                    match self.hotels.mark_invalid_for_search(hotel_id).await {
                        Ok(_) => DetailOutcome::Denylisted,
                        Err(db) => {
                            warn!("Failed to denylist {}: {}", hotel_id, db);
                            DetailOutcome::Failed
                        }
                    }
                }
                fatal => return Err(fatal),
            },
        };

        self.pause(cancel).await?;
        Ok(outcome)
    }

    async fn ratings_one(
        &self,
        cancel: &CancellationToken,
        hotel_id: &str,
        token: &StageToken,
    ) -> Result<DetailOutcome, PipelineError> {
        let access = current_token(cancel, token).await?;
        let result = until_cancelled(cancel, self.api.fetch_ratings_detail(&access, hotel_id))
            .await
            .ok_or(PipelineError::Cancelled)?;

        let outcome = match result {
            Ok(data) => {
                let stored = self.hotels.upsert_ratings_data(&data).await;
                let rated = match data.overall_rating {
                    Some(overall) => self
                        .hotels
                        .update_source_rating(hotel_id, RatingSource::Amadeus, f64::from(overall))
                        .await
                        .map(|_| ()),
                    None => Ok(()),
                };
                match stored.and(rated) {
                    Ok(()) => DetailOutcome::Saved,
                    Err(e) => {
                        warn!("Failed to store ratings for {}: {}", hotel_id, e);
                        DetailOutcome::Failed
                    }
                }
            }
            Err(e @ (UpstreamError::Auth(_) | UpstreamError::Cancelled)) => return Err(e.into()),
            Err(e) => {
                warn!("Ratings detail failed for {}: {}", hotel_id, e);
                DetailOutcome::Failed
            }
        };

        self.pause(cancel).await?;
        Ok(outcome)
    }

    /// Hold the worker slot for the configured delay.
    async fn pause(&self, cancel: &CancellationToken) -> Result<(), PipelineError> {
        if sleep_or_cancel(cancel, self.delay).await {
            Ok(())
        } else {
            Err(PipelineError::Cancelled)
        }
    }
}

/// Search failures about the hotel itself become `PermanentUnsupported`;
/// the rest keep their own class and abort the stage.
fn classify_search_failure(err: UpstreamError) -> PipelineError {
    match err {
        e if e.is_permanent_for_search() => PipelineError::PermanentUnsupported(e.to_string()),
        e => e.into(),
    }
}

async fn current_token(
    cancel: &CancellationToken,
    token: &StageToken,
) -> Result<AccessToken, PipelineError> {
    Ok(until_cancelled(cancel, token.get())
        .await
        .ok_or(PipelineError::Cancelled)??)
}
