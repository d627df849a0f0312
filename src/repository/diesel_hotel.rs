//! Hotel repository: canonical records, detail payloads, and the search denylist.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Double, Integer, Nullable, Text};
use diesel_async::RunQueryDsl;

use super::diesel_models::HotelRecord;
use super::pool::{DbPool, DieselError};
use super::util::json_text;
use crate::models::{Hotel, RatingSource};
use crate::schema::{hotels, invalid_hotel_search_ids};
use crate::upstream::{HotelRatingsData, HotelSearchData};
use crate::with_conn;

/// Owns writes to `hotels`, the detail tables, and `invalid_hotel_search_ids`.
#[derive(Clone)]
pub struct DieselHotelRepository {
    pool: DbPool,
}

impl DieselHotelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or update a hotel by `hotel_id`.
    ///
    /// Catalog fields are overwritten. Each per-source rating is coalesced so
    /// a missing incoming rating never erases a stored one. Recommendation
    /// state is only set on first insert; afterwards it belongs to
    /// [`update_recommendation_fields`](Self::update_recommendation_fields)
    /// and [`update_admin_flag`](Self::update_admin_flag).
    pub async fn upsert(&self, hotel: &Hotel) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let created_at = hotel.created_at.to_rfc3339();
        let _guard = self.pool.write_guard().await;

        with_conn!(self.pool, conn => {
            diesel::sql_query(
                r#"INSERT INTO hotels (
                    hotel_id, source, source_hotel_id, name, city, country,
                    latitude, longitude, street_address, postal_code, phone, website, email,
                    amadeus_rating, expedia_rating, tripadvisor_rating, google_rating, booking_rating,
                    recommended, admin_flag, quality, quiet, important_note,
                    hotel_type, chain_code, dupe_id, iata_code, last_update,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(hotel_id) DO UPDATE SET
                    source = excluded.source,
                    source_hotel_id = excluded.source_hotel_id,
                    name = excluded.name,
                    city = excluded.city,
                    country = excluded.country,
                    latitude = excluded.latitude,
                    longitude = excluded.longitude,
                    street_address = excluded.street_address,
                    postal_code = excluded.postal_code,
                    phone = excluded.phone,
                    website = excluded.website,
                    email = excluded.email,
                    amadeus_rating = COALESCE(excluded.amadeus_rating, hotels.amadeus_rating),
                    expedia_rating = COALESCE(excluded.expedia_rating, hotels.expedia_rating),
                    tripadvisor_rating = COALESCE(excluded.tripadvisor_rating, hotels.tripadvisor_rating),
                    google_rating = COALESCE(excluded.google_rating, hotels.google_rating),
                    booking_rating = COALESCE(excluded.booking_rating, hotels.booking_rating),
                    hotel_type = excluded.hotel_type,
                    chain_code = excluded.chain_code,
                    dupe_id = excluded.dupe_id,
                    iata_code = excluded.iata_code,
                    last_update = excluded.last_update,
                    updated_at = excluded.updated_at"#,
            )
            .bind::<Text, _>(&hotel.hotel_id)
            .bind::<Text, _>(&hotel.source)
            .bind::<Nullable<Text>, _>(hotel.source_hotel_id.as_deref())
            .bind::<Text, _>(&hotel.name)
            .bind::<Nullable<Text>, _>(hotel.city.as_deref())
            .bind::<Nullable<Text>, _>(hotel.country.as_deref())
            .bind::<Nullable<Double>, _>(hotel.latitude)
            .bind::<Nullable<Double>, _>(hotel.longitude)
            .bind::<Nullable<Text>, _>(hotel.street_address.as_deref())
            .bind::<Nullable<Text>, _>(hotel.postal_code.as_deref())
            .bind::<Nullable<Text>, _>(hotel.phone.as_deref())
            .bind::<Nullable<Text>, _>(hotel.website.as_deref())
            .bind::<Nullable<Text>, _>(hotel.email.as_deref())
            .bind::<Nullable<Double>, _>(hotel.amadeus_rating)
            .bind::<Nullable<Double>, _>(hotel.expedia_rating)
            .bind::<Nullable<Double>, _>(hotel.tripadvisor_rating)
            .bind::<Nullable<Double>, _>(hotel.google_rating)
            .bind::<Nullable<Double>, _>(hotel.booking_rating)
            .bind::<Bool, _>(hotel.recommended)
            .bind::<Bool, _>(hotel.admin_flag)
            .bind::<Bool, _>(hotel.quality)
            .bind::<Bool, _>(hotel.quiet)
            .bind::<Nullable<Text>, _>(hotel.important_note.as_deref())
            .bind::<Nullable<Text>, _>(hotel.hotel_type.as_deref())
            .bind::<Nullable<Text>, _>(hotel.chain_code.as_deref())
            .bind::<Nullable<BigInt>, _>(hotel.dupe_id)
            .bind::<Nullable<Text>, _>(hotel.iata_code.as_deref())
            .bind::<Nullable<Text>, _>(hotel.last_update.as_deref())
            .bind::<Text, _>(&created_at)
            .bind::<Text, _>(&now)
            .execute(&mut conn)
            .await?;
            Ok(())
        })
    }

    /// Get a hotel by ID. `Ok(None)` means no such row.
    pub async fn get(&self, hotel_id: &str) -> Result<Option<Hotel>, DieselError> {
        with_conn!(self.pool, conn => {
            hotels::table
                .find(hotel_id)
                .select(HotelRecord::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map(|r| r.map(Hotel::from))
        })
    }

    /// All hotel IDs, ordered. Drives the detail and recommendation stages.
    pub async fn list_ids(&self) -> Result<Vec<String>, DieselError> {
        with_conn!(self.pool, conn => {
            hotels::table
                .select(hotels::hotel_id)
                .order(hotels::hotel_id.asc())
                .load(&mut conn)
                .await
        })
    }

    pub async fn count(&self) -> Result<u64, DieselError> {
        with_conn!(self.pool, conn => {
            let count: i64 = hotels::table.count().get_result(&mut conn).await?;
            Ok(count as u64)
        })
    }

    pub async fn is_invalid_for_search(&self, hotel_id: &str) -> Result<bool, DieselError> {
        with_conn!(self.pool, conn => {
            let count: i64 = invalid_hotel_search_ids::table
                .filter(invalid_hotel_search_ids::hotel_id.eq(hotel_id))
                .count()
                .get_result(&mut conn)
                .await?;
            Ok(count > 0)
        })
    }

    /// Put a hotel on the search denylist. Returns `false` if it was already there.
    pub async fn mark_invalid_for_search(&self, hotel_id: &str) -> Result<bool, DieselError> {
        let now = Utc::now().to_rfc3339();
        let _guard = self.pool.write_guard().await;

        with_conn!(self.pool, conn => {
            let rows = diesel::insert_into(invalid_hotel_search_ids::table)
                .values((
                    invalid_hotel_search_ids::hotel_id.eq(hotel_id),
                    invalid_hotel_search_ids::created_at.eq(&now),
                ))
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .await?;
            Ok(rows > 0)
        })
    }

    pub async fn list_invalid_for_search(&self) -> Result<Vec<String>, DieselError> {
        with_conn!(self.pool, conn => {
            invalid_hotel_search_ids::table
                .select(invalid_hotel_search_ids::hotel_id)
                .order(invalid_hotel_search_ids::hotel_id.asc())
                .load(&mut conn)
                .await
        })
    }

    /// Write the system-computed recommendation state. Returns `false` if the hotel doesn't exist.
    pub async fn update_recommendation_fields(
        &self,
        hotel_id: &str,
        recommended: bool,
        quality: bool,
        quiet: bool,
        important_note: Option<&str>,
    ) -> Result<bool, DieselError> {
        let now = Utc::now().to_rfc3339();
        let _guard = self.pool.write_guard().await;

        with_conn!(self.pool, conn => {
            let rows = diesel::update(hotels::table.find(hotel_id))
                .set((
                    hotels::recommended.eq(recommended),
                    hotels::quality.eq(quality),
                    hotels::quiet.eq(quiet),
                    hotels::important_note.eq(important_note),
                    hotels::updated_at.eq(&now),
                ))
                .execute(&mut conn)
                .await?;
            Ok(rows > 0)
        })
    }

    /// Set or clear the admin override. Returns `false` if the hotel doesn't exist.
    pub async fn update_admin_flag(&self, hotel_id: &str, disabled: bool) -> Result<bool, DieselError> {
        let now = Utc::now().to_rfc3339();
        let _guard = self.pool.write_guard().await;

        with_conn!(self.pool, conn => {
            let rows = diesel::update(hotels::table.find(hotel_id))
                .set((hotels::admin_flag.eq(disabled), hotels::updated_at.eq(&now)))
                .execute(&mut conn)
                .await?;
            Ok(rows > 0)
        })
    }

    /// Record one source's rating. Returns `false` if the hotel doesn't exist.
    pub async fn update_source_rating(
        &self,
        hotel_id: &str,
        source: RatingSource,
        rating: f64,
    ) -> Result<bool, DieselError> {
        let now = Utc::now().to_rfc3339();
        let _guard = self.pool.write_guard().await;

        // Column names come from a closed enum, never from input.
        let query = format!(
            "UPDATE hotels SET {} = ?, updated_at = ? WHERE hotel_id = ?",
            source.column()
        );
        with_conn!(self.pool, conn => {
            let rows = diesel::sql_query(query)
                .bind::<Double, _>(rating)
                .bind::<Text, _>(&now)
                .bind::<Text, _>(hotel_id)
                .execute(&mut conn)
                .await?;
            Ok(rows > 0)
        })
    }

    /// Store the latest search detail payload for a hotel (replaces).
    pub async fn upsert_search_data(&self, data: &HotelSearchData) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let _guard = self.pool.write_guard().await;

        with_conn!(self.pool, conn => {
            diesel::sql_query(
                r#"INSERT OR REPLACE INTO hotel_search_data (
                    hotel_id, data_type, chain_code, dupe_id, name, rating, official_rating,
                    description, media, amenities, address, contact, policies, available,
                    offers, self_link, hotel_distance, last_update, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind::<Text, _>(&data.hotel_id)
            .bind::<Nullable<Text>, _>(data.kind.as_deref())
            .bind::<Nullable<Text>, _>(data.chain_code.as_deref())
            .bind::<Nullable<BigInt>, _>(data.dupe_id)
            .bind::<Nullable<Text>, _>(data.name.as_deref())
            .bind::<Nullable<Integer>, _>(data.rating)
            .bind::<Nullable<Integer>, _>(data.official_rating)
            .bind::<Nullable<Text>, _>(json_text(&data.description))
            .bind::<Nullable<Text>, _>(json_text(&data.media))
            .bind::<Nullable<Text>, _>(json_text(&data.amenities))
            .bind::<Nullable<Text>, _>(json_text(&data.address))
            .bind::<Nullable<Text>, _>(json_text(&data.contact))
            .bind::<Nullable<Text>, _>(json_text(&data.policies))
            .bind::<Bool, _>(data.available)
            .bind::<Nullable<Text>, _>(json_text(&data.offers))
            .bind::<Nullable<Text>, _>(data.self_link.as_deref())
            .bind::<Nullable<Text>, _>(json_text(&data.hotel_distance))
            .bind::<Nullable<Text>, _>(data.last_update.as_deref())
            .bind::<Text, _>(&now)
            .execute(&mut conn)
            .await?;
            Ok(())
        })
    }

    /// Store the latest sentiment payload for a hotel (replaces).
    pub async fn upsert_ratings_data(&self, data: &HotelRatingsData) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let _guard = self.pool.write_guard().await;

        with_conn!(self.pool, conn => {
            diesel::sql_query(
                r#"INSERT OR REPLACE INTO hotel_ratings_data (
                    hotel_id, data_type, number_of_reviews, number_of_ratings,
                    overall_rating, sentiments, last_update, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind::<Text, _>(&data.hotel_id)
            .bind::<Nullable<Text>, _>(data.kind.as_deref())
            .bind::<Nullable<Integer>, _>(data.number_of_reviews)
            .bind::<Nullable<Integer>, _>(data.number_of_ratings)
            .bind::<Nullable<Integer>, _>(data.overall_rating)
            .bind::<Nullable<Text>, _>(json_text(&data.sentiments))
            .bind::<Nullable<Text>, _>(data.last_update.as_deref())
            .bind::<Text, _>(&now)
            .execute(&mut conn)
            .await?;
            Ok(())
        })
    }

    /// Whether search detail has been stored for a hotel.
    pub async fn has_search_data(&self, hotel_id: &str) -> Result<bool, DieselError> {
        use crate::schema::hotel_search_data;

        with_conn!(self.pool, conn => {
            let count: i64 = hotel_search_data::table
                .filter(hotel_search_data::hotel_id.eq(hotel_id))
                .count()
                .get_result(&mut conn)
                .await?;
            Ok(count > 0)
        })
    }

    /// Stored overall sentiment score for a hotel, if any.
    pub async fn overall_sentiment(&self, hotel_id: &str) -> Result<Option<i32>, DieselError> {
        use crate::schema::hotel_ratings_data;

        with_conn!(self.pool, conn => {
            let score: Option<Option<i32>> = hotel_ratings_data::table
                .find(hotel_id)
                .select(hotel_ratings_data::overall_rating)
                .first(&mut conn)
                .await
                .optional()?;
            Ok(score.flatten())
        })
    }
}
