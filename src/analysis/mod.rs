//! Dual-aspect review analysis.
//!
//! Quality and quiet are scored by two independent provider calls that run
//! concurrently. The first error or a cancellation ends the wait; the other
//! call is dropped and its result never observed.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::llm::{LlmError, LlmProvider, QualityAnalysis, QuietAnalysis};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no review texts to analyze")]
    NoReviews,
    #[error("quality analysis failed: {0}")]
    Quality(#[source] LlmError),
    #[error("quiet analysis failed: {0}")]
    Quiet(#[source] LlmError),
    #[error("analysis cancelled")]
    Cancelled,
}

/// Both aspects for one batch of reviews.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub quality: QualityAnalysis,
    pub quiet: QuietAnalysis,
    /// Texts actually sent, after the cap.
    pub reviews_analyzed: usize,
}

pub struct AnalysisEngine {
    provider: Arc<dyn LlmProvider>,
    max_reviews: usize,
}

impl AnalysisEngine {
    pub fn new(provider: Arc<dyn LlmProvider>, max_reviews: usize) -> Self {
        Self {
            provider,
            max_reviews: max_reviews.max(1),
        }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Score `review_texts`, which are expected newest first.
    ///
    /// Only the first `max_reviews` texts are sent.
    pub async fn analyze(
        &self,
        cancel: &CancellationToken,
        review_texts: &[String],
    ) -> Result<Analysis, AnalysisError> {
        if review_texts.is_empty() {
            return Err(AnalysisError::NoReviews);
        }
        let batch = &review_texts[..review_texts.len().min(self.max_reviews)];
        debug!("Analyzing {} reviews with {}", batch.len(), self.model_name());

        let quality = self.provider.analyze_quality(batch);
        let quiet = self.provider.analyze_quiet(batch);
        tokio::pin!(quality);
        tokio::pin!(quiet);

        let mut quality_done: Option<QualityAnalysis> = None;
        let mut quiet_done: Option<QuietAnalysis> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
                res = &mut quality, if quality_done.is_none() => {
                    quality_done = Some(res.map_err(AnalysisError::Quality)?);
                }
                res = &mut quiet, if quiet_done.is_none() => {
                    quiet_done = Some(res.map_err(AnalysisError::Quiet)?);
                }
            }

            match (quality_done.take(), quiet_done.take()) {
                (Some(quality), Some(quiet)) => {
                    return Ok(Analysis {
                        quality,
                        quiet,
                        reviews_analyzed: batch.len(),
                    })
                }
                (q, z) => {
                    quality_done = q;
                    quiet_done = z;
                }
            }
        }
    }
}
