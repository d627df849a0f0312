//! Review repository.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Double, Integer, Nullable, Text};
use diesel_async::RunQueryDsl;

use super::diesel_models::ReviewRecord;
use super::pool::{DbPool, DieselError};
use crate::models::HotelReview;
use crate::schema::hotel_reviews;
use crate::with_conn;

#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a review or overwrite the stored copy.
    ///
    /// Keyed by `(hotel_id, source, source_review_id)`. On conflict every
    /// mutable field takes the incoming value, including nulls: the source's
    /// latest snapshot is authoritative.
    pub async fn save(&self, review: &HotelReview) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let review_date = review.review_date.map(|d| d.to_rfc3339());
        let stay_date = review.stay_date.map(|d| d.to_rfc3339());
        let _guard = self.pool.write_guard().await;

        with_conn!(self.pool, conn => {
            diesel::sql_query(
                r#"INSERT INTO hotel_reviews (
                    hotel_id, source, source_review_id, reviewer_name, reviewer_location,
                    rating, review_text, review_date, verified, helpful_count,
                    room_type, travel_type, stay_date, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(hotel_id, source, source_review_id) DO UPDATE SET
                    reviewer_name = excluded.reviewer_name,
                    reviewer_location = excluded.reviewer_location,
                    rating = excluded.rating,
                    review_text = excluded.review_text,
                    review_date = excluded.review_date,
                    verified = excluded.verified,
                    helpful_count = excluded.helpful_count,
                    room_type = excluded.room_type,
                    travel_type = excluded.travel_type,
                    stay_date = excluded.stay_date,
                    updated_at = excluded.updated_at"#,
            )
            .bind::<Text, _>(&review.hotel_id)
            .bind::<Text, _>(&review.source)
            .bind::<Text, _>(&review.source_review_id)
            .bind::<Nullable<Text>, _>(review.reviewer_name.as_deref())
            .bind::<Nullable<Text>, _>(review.reviewer_location.as_deref())
            .bind::<Nullable<Double>, _>(review.rating)
            .bind::<Text, _>(&review.review_text)
            .bind::<Nullable<Text>, _>(review_date.as_deref())
            .bind::<Bool, _>(review.verified)
            .bind::<Integer, _>(review.helpful_count)
            .bind::<Nullable<Text>, _>(review.room_type.as_deref())
            .bind::<Nullable<Text>, _>(review.travel_type.as_deref())
            .bind::<Nullable<Text>, _>(stay_date.as_deref())
            .bind::<Text, _>(&now)
            .bind::<Text, _>(&now)
            .execute(&mut conn)
            .await?;
            Ok(())
        })
    }

    /// Reviews for a hotel, newest review date first, then newest stored first.
    ///
    /// Reviews without a date sort after dated ones.
    pub async fn get_for_hotel(&self, hotel_id: &str) -> Result<Vec<HotelReview>, DieselError> {
        with_conn!(self.pool, conn => {
            let records: Vec<ReviewRecord> = hotel_reviews::table
                .filter(hotel_reviews::hotel_id.eq(hotel_id))
                .order((
                    hotel_reviews::review_date.is_null().asc(),
                    hotel_reviews::review_date.desc(),
                    hotel_reviews::created_at.desc(),
                    hotel_reviews::id.desc(),
                ))
                .select(ReviewRecord::as_select())
                .load(&mut conn)
                .await?;
            Ok(records.into_iter().map(HotelReview::from).collect())
        })
    }

    /// Non-blank review texts in [`get_for_hotel`](Self::get_for_hotel) order.
    pub async fn review_texts(&self, hotel_id: &str) -> Result<Vec<String>, DieselError> {
        with_conn!(self.pool, conn => {
            let texts: Vec<String> = hotel_reviews::table
                .filter(hotel_reviews::hotel_id.eq(hotel_id))
                .order((
                    hotel_reviews::review_date.is_null().asc(),
                    hotel_reviews::review_date.desc(),
                    hotel_reviews::created_at.desc(),
                    hotel_reviews::id.desc(),
                ))
                .select(hotel_reviews::review_text)
                .load(&mut conn)
                .await?;
            Ok(texts.into_iter().filter(|t| !t.trim().is_empty()).collect())
        })
    }

    pub async fn count_for_hotel(&self, hotel_id: &str) -> Result<u64, DieselError> {
        with_conn!(self.pool, conn => {
            let count: i64 = hotel_reviews::table
                .filter(hotel_reviews::hotel_id.eq(hotel_id))
                .count()
                .get_result(&mut conn)
                .await?;
            Ok(count as u64)
        })
    }
}
