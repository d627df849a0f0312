//! Per-hotel recommendation control loop.

mod verdict;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::analysis::AnalysisEngine;
use crate::error::PipelineError;
use crate::models::HotelRecommendation;
use crate::repository::{
    DieselError, DieselHotelRepository, DieselRecommendationRepository, HotelVerdictFields,
};
use crate::reviews::ReviewAggregator;

pub use verdict::{important_note, recommendation_summary, Verdict};

/// Why a hotel was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A human excluded the hotel from automated processing.
    AdminFlag,
    NoReviews,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AdminFlag => write!(f, "admin flag set"),
            Self::NoReviews => write!(f, "no reviews"),
        }
    }
}

/// Terminal states other than failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed { recommended: bool },
    Skipped(SkipReason),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drives crawl, analysis and verdict persistence for each hotel.
///
/// The only writer of `hotel_recommendations` and of the hotel's
/// recommendation-state columns.
pub struct RecommendationOrchestrator {
    hotels: DieselHotelRepository,
    recommendations: DieselRecommendationRepository,
    aggregator: ReviewAggregator,
    engine: AnalysisEngine,
    threshold: f64,
}

impl RecommendationOrchestrator {
    pub fn new(
        hotels: DieselHotelRepository,
        recommendations: DieselRecommendationRepository,
        aggregator: ReviewAggregator,
        engine: AnalysisEngine,
        threshold: f64,
    ) -> Self {
        Self {
            hotels,
            recommendations,
            aggregator,
            engine,
            threshold,
        }
    }

    /// Run one hotel through load, override check, crawl, analysis and persist.
    ///
    /// Nothing is written unless analysis succeeds.
    pub async fn process_hotel(
        &self,
        cancel: &CancellationToken,
        hotel_id: &str,
    ) -> Result<ProcessOutcome, PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let hotel = self
            .hotels
            .get(hotel_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(hotel_id.to_string()))?;

        if hotel.admin_flag {
            debug!("Skipping {}: admin flag set", hotel_id);
            return Ok(ProcessOutcome::Skipped(SkipReason::AdminFlag));
        }

        self.aggregator.crawl_all_sources(cancel, &hotel).await?;

        let texts = self.aggregator.get_review_texts(hotel_id).await?;
        if texts.is_empty() {
            debug!("Skipping {}: no reviews", hotel_id);
            return Ok(ProcessOutcome::Skipped(SkipReason::NoReviews));
        }

        let analysis = self.engine.analyze(cancel, &texts).await?;
        let verdict = Verdict::from_analysis(&analysis.quality, &analysis.quiet, self.threshold);

        let recommendation = HotelRecommendation {
            hotel_id: hotel_id.to_string(),
            quality_score: analysis.quality.score,
            quality_confidence: analysis.quality.confidence,
            quality_reasoning: Some(analysis.quality.reasoning.clone()),
            quiet_score: analysis.quiet.score,
            quiet_confidence: analysis.quiet.confidence,
            quiet_reasoning: Some(analysis.quiet.reasoning.clone()),
            overall_recommended: verdict.recommended,
            recommendation_summary: Some(recommendation_summary(
                &analysis.quality,
                &analysis.quiet,
                verdict.recommended,
            )),
            reviews_analyzed: analysis.reviews_analyzed as i32,
            llm_model: self.engine.model_name().to_string(),
            processed_at: Utc::now(),
        };
        let fields = HotelVerdictFields {
            recommended: verdict.recommended,
            quality: verdict.quality,
            quiet: verdict.quiet,
            important_note: Some(important_note(&analysis.quality, &analysis.quiet)),
        };

        self.recommendations
            .save_with_hotel_state(&recommendation, &fields)
            .await
            .map_err(|e| match e {
                DieselError::NotFound => PipelineError::NotFound(hotel_id.to_string()),
                other => PipelineError::Database(other),
            })?;

        info!(
            "{}: {} (quality {:.2}, quiet {:.2}, {} reviews)",
            hotel_id,
            if verdict.recommended {
                "recommended"
            } else {
                "not recommended"
            },
            analysis.quality.score,
            analysis.quiet.score,
            analysis.reviews_analyzed
        );
        Ok(ProcessOutcome::Completed {
            recommended: verdict.recommended,
        })
    }

    /// Process `hotel_ids` one after another.
    ///
    /// Per-hotel failures are logged and counted. Cancellation stops the batch.
    pub async fn process_ids(
        &self,
        cancel: &CancellationToken,
        hotel_ids: &[String],
    ) -> Result<BatchSummary, PipelineError> {
        let mut summary = BatchSummary::default();

        for hotel_id in hotel_ids {
            match self.process_hotel(cancel, hotel_id).await {
                Ok(ProcessOutcome::Completed { .. }) => summary.completed += 1,
                Ok(ProcessOutcome::Skipped(_)) => summary.skipped += 1,
                Err(PipelineError::Cancelled) => return Err(PipelineError::Cancelled),
                Err(PipelineError::NotFound(id)) => {
                    warn!("Hotel {} not found", id);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("Recommendation failed for {}: {}", hotel_id, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Recommendations: {} completed, {} skipped, {} failed",
            summary.completed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Process every stored hotel.
    pub async fn process_all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, PipelineError> {
        let ids = self.hotels.list_ids().await?;
        self.process_ids(cancel, &ids).await
    }
}
