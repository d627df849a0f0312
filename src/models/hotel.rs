//! Canonical hotel record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External rating sources that each own one rating column on a hotel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSource {
    Amadeus,
    Expedia,
    Tripadvisor,
    Google,
    Booking,
}

impl RatingSource {
    pub const ALL: [RatingSource; 5] = [
        Self::Amadeus,
        Self::Expedia,
        Self::Tripadvisor,
        Self::Google,
        Self::Booking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amadeus => "amadeus",
            Self::Expedia => "expedia",
            Self::Tripadvisor => "tripadvisor",
            Self::Google => "google",
            Self::Booking => "booking",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "amadeus" => Some(Self::Amadeus),
            "expedia" => Some(Self::Expedia),
            "tripadvisor" => Some(Self::Tripadvisor),
            "google" => Some(Self::Google),
            "booking" => Some(Self::Booking),
            _ => None,
        }
    }

    /// Column holding this source's rating in the `hotels` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Amadeus => "amadeus_rating",
            Self::Expedia => "expedia_rating",
            Self::Tripadvisor => "tripadvisor_rating",
            Self::Google => "google_rating",
            Self::Booking => "booking_rating",
        }
    }
}

impl std::fmt::Display for RatingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hotel keyed by its provider-assigned `hotel_id`.
///
/// Catalog fields are refreshed on every ingestion run. Rating fields are
/// merged per source, and the recommendation-state fields (`recommended`,
/// `admin_flag`, `quality`, `quiet`, `important_note`) are only written by the
/// recommendation stage and the admin override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub hotel_id: String,
    /// Provenance tag (e.g. "amadeus").
    pub source: String,
    pub source_hotel_id: Option<String>,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub amadeus_rating: Option<f64>,
    pub expedia_rating: Option<f64>,
    pub tripadvisor_rating: Option<f64>,
    pub google_rating: Option<f64>,
    pub booking_rating: Option<f64>,
    pub recommended: bool,
    /// Human override: when set the hotel is never processed automatically.
    pub admin_flag: bool,
    pub quality: bool,
    pub quiet: bool,
    pub important_note: Option<String>,
    pub hotel_type: Option<String>,
    pub chain_code: Option<String>,
    pub dupe_id: Option<i64>,
    pub iata_code: Option<String>,
    pub last_update: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hotel {
    /// Create a hotel with only identity fields set.
    pub fn new(
        hotel_id: impl Into<String>,
        source: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            hotel_id: hotel_id.into(),
            source: source.into(),
            source_hotel_id: None,
            name: name.into(),
            city: None,
            country: None,
            latitude: None,
            longitude: None,
            street_address: None,
            postal_code: None,
            phone: None,
            website: None,
            email: None,
            amadeus_rating: None,
            expedia_rating: None,
            tripadvisor_rating: None,
            google_rating: None,
            booking_rating: None,
            recommended: false,
            admin_flag: false,
            quality: false,
            quiet: false,
            important_note: None,
            hotel_type: None,
            chain_code: None,
            dupe_id: None,
            iata_code: None,
            last_update: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rating(&self, source: RatingSource) -> Option<f64> {
        match source {
            RatingSource::Amadeus => self.amadeus_rating,
            RatingSource::Expedia => self.expedia_rating,
            RatingSource::Tripadvisor => self.tripadvisor_rating,
            RatingSource::Google => self.google_rating,
            RatingSource::Booking => self.booking_rating,
        }
    }

    pub fn set_rating(&mut self, source: RatingSource, rating: Option<f64>) {
        let slot = match source {
            RatingSource::Amadeus => &mut self.amadeus_rating,
            RatingSource::Expedia => &mut self.expedia_rating,
            RatingSource::Tripadvisor => &mut self.tripadvisor_rating,
            RatingSource::Google => &mut self.google_rating,
            RatingSource::Booking => &mut self.booking_rating,
        };
        *slot = rating;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_source_roundtrip() {
        for source in RatingSource::ALL {
            assert_eq!(RatingSource::from_str(source.as_str()), Some(source));
        }
        assert_eq!(RatingSource::from_str("TripAdvisor"), Some(RatingSource::Tripadvisor));
        assert_eq!(RatingSource::from_str("yelp"), None);
    }

    #[test]
    fn test_set_rating_targets_one_source() {
        let mut hotel = Hotel::new("H1", "amadeus", "Grand");
        hotel.set_rating(RatingSource::Google, Some(4.5));

        assert_eq!(hotel.rating(RatingSource::Google), Some(4.5));
        assert_eq!(hotel.rating(RatingSource::Booking), None);
        assert!(!hotel.admin_flag);
    }
}
