//! Diesel ORM models for database tables.
//!
//! Writes that need conflict handling go through `sql_query` in the
//! repositories; these records cover typed reads.

use diesel::prelude::*;

use super::util::{parse_datetime, parse_datetime_opt};
use crate::models::{Hotel, HotelRecommendation, HotelReview};
use crate::schema;

/// Hotel record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::hotels)]
#[diesel(primary_key(hotel_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HotelRecord {
    pub hotel_id: String,
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
    pub admin_flag: bool,
    pub quality: bool,
    pub quiet: bool,
    pub important_note: Option<String>,
    pub hotel_type: Option<String>,
    pub chain_code: Option<String>,
    pub dupe_id: Option<i64>,
    pub iata_code: Option<String>,
    pub last_update: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<HotelRecord> for Hotel {
    fn from(record: HotelRecord) -> Self {
        Hotel {
            hotel_id: record.hotel_id,
            source: record.source,
            source_hotel_id: record.source_hotel_id,
            name: record.name,
            city: record.city,
            country: record.country,
            latitude: record.latitude,
            longitude: record.longitude,
            street_address: record.street_address,
            postal_code: record.postal_code,
            phone: record.phone,
            website: record.website,
            email: record.email,
            amadeus_rating: record.amadeus_rating,
            expedia_rating: record.expedia_rating,
            tripadvisor_rating: record.tripadvisor_rating,
            google_rating: record.google_rating,
            booking_rating: record.booking_rating,
            recommended: record.recommended,
            admin_flag: record.admin_flag,
            quality: record.quality,
            quiet: record.quiet,
            important_note: record.important_note,
            hotel_type: record.hotel_type,
            chain_code: record.chain_code,
            dupe_id: record.dupe_id,
            iata_code: record.iata_code,
            last_update: record.last_update,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Review record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::hotel_reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReviewRecord {
    pub id: i32,
    pub hotel_id: String,
    pub source: String,
    pub source_review_id: String,
    pub reviewer_name: Option<String>,
    pub reviewer_location: Option<String>,
    pub rating: Option<f64>,
    pub review_text: String,
    pub review_date: Option<String>,
    pub verified: bool,
    pub helpful_count: i32,
    pub room_type: Option<String>,
    pub travel_type: Option<String>,
    pub stay_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ReviewRecord> for HotelReview {
    fn from(record: ReviewRecord) -> Self {
        HotelReview {
            hotel_id: record.hotel_id,
            source: record.source,
            source_review_id: record.source_review_id,
            reviewer_name: record.reviewer_name,
            reviewer_location: record.reviewer_location,
            rating: record.rating,
            review_text: record.review_text,
            review_date: parse_datetime_opt(record.review_date),
            verified: record.verified,
            helpful_count: record.helpful_count,
            room_type: record.room_type,
            travel_type: record.travel_type,
            stay_date: parse_datetime_opt(record.stay_date),
        }
    }
}

/// Recommendation record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::hotel_recommendations)]
#[diesel(primary_key(hotel_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecommendationRecord {
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
    pub llm_model: String,
    pub processed_at: String,
}

impl From<RecommendationRecord> for HotelRecommendation {
    fn from(record: RecommendationRecord) -> Self {
        HotelRecommendation {
            hotel_id: record.hotel_id,
            quality_score: record.quality_score,
            quality_confidence: record.quality_confidence,
            quality_reasoning: record.quality_reasoning,
            quiet_score: record.quiet_score,
            quiet_confidence: record.quiet_confidence,
            quiet_reasoning: record.quiet_reasoning,
            overall_recommended: record.overall_recommended,
            recommendation_summary: record.recommendation_summary,
            reviews_analyzed: record.reviews_analyzed,
            llm_model: record.llm_model,
            processed_at: parse_datetime(&record.processed_at),
        }
    }
}

/// New recommendation for insertion (replaces any existing row).
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::hotel_recommendations)]
pub struct NewRecommendation<'a> {
    pub hotel_id: &'a str,
    pub quality_score: f64,
    pub quality_confidence: f64,
    pub quality_reasoning: Option<&'a str>,
    pub quiet_score: f64,
    pub quiet_confidence: f64,
    pub quiet_reasoning: Option<&'a str>,
    pub overall_recommended: bool,
    pub recommendation_summary: Option<&'a str>,
    pub reviews_analyzed: i32,
    pub llm_model: &'a str,
    pub processed_at: String,
}

impl<'a> NewRecommendation<'a> {
    pub fn from_model(rec: &'a HotelRecommendation) -> Self {
        Self {
            hotel_id: &rec.hotel_id,
            quality_score: rec.quality_score,
            quality_confidence: rec.quality_confidence,
            quality_reasoning: rec.quality_reasoning.as_deref(),
            quiet_score: rec.quiet_score,
            quiet_confidence: rec.quiet_confidence,
            quiet_reasoning: rec.quiet_reasoning.as_deref(),
            overall_recommended: rec.overall_recommended,
            recommendation_summary: rec.recommendation_summary.as_deref(),
            reviews_analyzed: rec.reviews_analyzed,
            llm_model: &rec.llm_model,
            processed_at: rec.processed_at.to_rfc3339(),
        }
    }
}
