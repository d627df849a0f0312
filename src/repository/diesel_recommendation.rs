//! Recommendation repository.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_models::{NewRecommendation, RecommendationRecord};
use super::pool::{DbPool, DieselError};
use crate::models::HotelRecommendation;
use crate::schema::{hotel_recommendations, hotels};
use crate::with_conn;

/// Derived per-aspect flags written onto the hotel alongside a verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelVerdictFields {
    pub recommended: bool,
    pub quality: bool,
    pub quiet: bool,
    pub important_note: Option<String>,
}

#[derive(Clone)]
pub struct DieselRecommendationRepository {
    pool: DbPool,
}

impl DieselRecommendationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Replace the recommendation and update the hotel's state in one transaction.
    ///
    /// Fails with `NotFound` (and writes nothing) if the hotel row is gone.
    pub async fn save_with_hotel_state(
        &self,
        rec: &HotelRecommendation,
        fields: &HotelVerdictFields,
    ) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let new_rec = NewRecommendation::from_model(rec);
        let _guard = self.pool.write_guard().await;
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                let rows = diesel::update(hotels::table.find(&rec.hotel_id))
                    .set((
                        hotels::recommended.eq(fields.recommended),
                        hotels::quality.eq(fields.quality),
                        hotels::quiet.eq(fields.quiet),
                        hotels::important_note.eq(fields.important_note.as_deref()),
                        hotels::updated_at.eq(&now),
                    ))
                    .execute(conn)
                    .await?;
                if rows == 0 {
                    return Err(DieselError::NotFound);
                }

                diesel::replace_into(hotel_recommendations::table)
                    .values(&new_rec)
                    .execute(conn)
                    .await?;
                Ok(())
            })
        })
        .await
    }

    /// Latest recommendation for a hotel, if it has been processed.
    pub async fn get(&self, hotel_id: &str) -> Result<Option<HotelRecommendation>, DieselError> {
        with_conn!(self.pool, conn => {
            hotel_recommendations::table
                .find(hotel_id)
                .select(RecommendationRecord::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map(|r| r.map(HotelRecommendation::from))
        })
    }

    pub async fn count(&self) -> Result<u64, DieselError> {
        with_conn!(self.pool, conn => {
            let count: i64 = hotel_recommendations::table
                .count()
                .get_result(&mut conn)
                .await?;
            Ok(count as u64)
        })
    }
}
