//! Latest recommendation verdict for a hotel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per hotel, replaced on every processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecommendation {
    pub hotel_id: String,
    pub quality_score: f64,
    pub quality_confidence: f64,
    pub quality_reasoning: Option<String>,
    pub quiet_score: f64,
    pub quiet_confidence: f64,
    pub quiet_reasoning: Option<String>,
    pub overall_recommended: bool,
    pub recommendation_summary: Option<String>,
    pub reviews_analyzed: i32,
    /// Model that produced the scores.
    pub llm_model: String,
    pub processed_at: DateTime<Utc>,
}
