//! Guest reviews gathered from third-party sites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Third-party sites reviews can be crawled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSourceKind {
    Tripadvisor,
    Google,
    Expedia,
    Booking,
    HotelWebsite,
    Bing,
    Yelp,
}

impl ReviewSourceKind {
    /// Crawl order used by the aggregator.
    pub const ALL: [ReviewSourceKind; 7] = [
        Self::Tripadvisor,
        Self::Google,
        Self::Expedia,
        Self::Booking,
        Self::HotelWebsite,
        Self::Bing,
        Self::Yelp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tripadvisor => "tripadvisor",
            Self::Google => "google",
            Self::Expedia => "expedia",
            Self::Booking => "booking",
            Self::HotelWebsite => "hotel_website",
            Self::Bing => "bing",
            Self::Yelp => "yelp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tripadvisor" => Some(Self::Tripadvisor),
            "google" => Some(Self::Google),
            "expedia" => Some(Self::Expedia),
            "booking" => Some(Self::Booking),
            "hotel_website" => Some(Self::HotelWebsite),
            "bing" => Some(Self::Bing),
            "yelp" => Some(Self::Yelp),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReviewSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single review, unique per `(hotel_id, source, source_review_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelReview {
    pub hotel_id: String,
    pub source: String,
    pub source_review_id: String,
    pub reviewer_name: Option<String>,
    pub reviewer_location: Option<String>,
    /// Absent is distinct from a zero rating.
    pub rating: Option<f64>,
    pub review_text: String,
    pub review_date: Option<DateTime<Utc>>,
    pub verified: bool,
    pub helpful_count: i32,
    pub room_type: Option<String>,
    pub travel_type: Option<String>,
    pub stay_date: Option<DateTime<Utc>>,
}

impl HotelReview {
    pub fn new(
        hotel_id: impl Into<String>,
        source: ReviewSourceKind,
        source_review_id: impl Into<String>,
        review_text: impl Into<String>,
    ) -> Self {
        Self {
            hotel_id: hotel_id.into(),
            source: source.as_str().to_string(),
            source_review_id: source_review_id.into(),
            reviewer_name: None,
            reviewer_location: None,
            rating: None,
            review_text: review_text.into(),
            review_date: None,
            verified: false,
            helpful_count: 0,
            room_type: None,
            travel_type: None,
            stay_date: None,
        }
    }

    /// Whether the text is usable as analysis input.
    pub fn has_text(&self) -> bool {
        !self.review_text.trim().is_empty()
    }
}
