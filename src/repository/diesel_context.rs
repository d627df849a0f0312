//! Database context for managing the connection pool and repository access.

use std::path::Path;

use diesel::QueryableByName;
use diesel_async::{RunQueryDsl, SimpleAsyncConnection};

use super::diesel_hotel::DieselHotelRepository;
use super::diesel_recommendation::DieselRecommendationRepository;
use super::diesel_review::DieselReviewRepository;
use super::pool::{DbPool, DieselError, SqliteConn};
use crate::with_conn;

/// Entry point for database operations.
///
/// Create one context per command, then hand its repositories to the
/// pipeline stages. All repositories share the pool's write lock.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::new(Path::new("alpaca.db"));
/// ctx.init_schema().await?;
/// let ids = ctx.hotels().list_ids().await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: DbPool,
}

impl DbContext {
    /// Create a new database context from a file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: DbPool::from_path(db_path),
        }
    }

    pub fn hotels(&self) -> DieselHotelRepository {
        DieselHotelRepository::new(self.pool.clone())
    }

    pub fn reviews(&self) -> DieselReviewRepository {
        DieselReviewRepository::new(self.pool.clone())
    }

    pub fn recommendations(&self) -> DieselRecommendationRepository {
        DieselRecommendationRepository::new(self.pool.clone())
    }

    /// Create tables and indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        with_conn!(self.pool, conn => Self::init_sqlite_schema(&mut conn).await)
    }

    async fn init_sqlite_schema(conn: &mut SqliteConn) -> Result<(), DieselError> {
        conn.batch_execute(
            r#"
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS hotels (
                hotel_id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                source_hotel_id TEXT,
                name TEXT NOT NULL,
                city TEXT,
                country TEXT,
                latitude REAL,
                longitude REAL,
                street_address TEXT,
                postal_code TEXT,
                phone TEXT,
                website TEXT,
                email TEXT,
                amadeus_rating REAL,
                expedia_rating REAL,
                tripadvisor_rating REAL,
                google_rating REAL,
                booking_rating REAL,
                recommended BOOLEAN NOT NULL DEFAULT 0,
                admin_flag BOOLEAN NOT NULL DEFAULT 0,
                quality BOOLEAN NOT NULL DEFAULT 0,
                quiet BOOLEAN NOT NULL DEFAULT 0,
                important_note TEXT,
                hotel_type TEXT,
                chain_code TEXT,
                dupe_id BIGINT,
                iata_code TEXT,
                last_update TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_hotels_city ON hotels(city);
            CREATE INDEX IF NOT EXISTS idx_hotels_recommended ON hotels(recommended);

            CREATE TABLE IF NOT EXISTS invalid_hotel_search_ids (
                hotel_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS hotel_search_data (
                hotel_id TEXT PRIMARY KEY,
                data_type TEXT,
                chain_code TEXT,
                dupe_id BIGINT,
                name TEXT,
                rating INTEGER,
                official_rating INTEGER,
                description TEXT,
                media TEXT,
                amenities TEXT,
                address TEXT,
                contact TEXT,
                policies TEXT,
                available BOOLEAN NOT NULL DEFAULT 0,
                offers TEXT,
                self_link TEXT,
                hotel_distance TEXT,
                last_update TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS hotel_ratings_data (
                hotel_id TEXT PRIMARY KEY,
                data_type TEXT,
                number_of_reviews INTEGER,
                number_of_ratings INTEGER,
                overall_rating INTEGER,
                sentiments TEXT,
                last_update TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS hotel_reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hotel_id TEXT NOT NULL,
                source TEXT NOT NULL,
                source_review_id TEXT NOT NULL,
                reviewer_name TEXT,
                reviewer_location TEXT,
                rating REAL,
                review_text TEXT NOT NULL,
                review_date TEXT,
                verified BOOLEAN NOT NULL DEFAULT 0,
                helpful_count INTEGER NOT NULL DEFAULT 0,
                room_type TEXT,
                travel_type TEXT,
                stay_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(hotel_id, source, source_review_id)
            );

            CREATE INDEX IF NOT EXISTS idx_hotel_reviews_hotel ON hotel_reviews(hotel_id);
            CREATE INDEX IF NOT EXISTS idx_hotel_reviews_date ON hotel_reviews(review_date);

            CREATE TABLE IF NOT EXISTS hotel_recommendations (
                hotel_id TEXT PRIMARY KEY,
                quality_score REAL NOT NULL,
                quality_confidence REAL NOT NULL,
                quality_reasoning TEXT,
                quiet_score REAL NOT NULL,
                quiet_confidence REAL NOT NULL,
                quiet_reasoning TEXT,
                overall_recommended BOOLEAN NOT NULL,
                recommendation_summary TEXT,
                reviews_analyzed INTEGER NOT NULL,
                llm_model TEXT NOT NULL,
                processed_at TEXT NOT NULL
            );
            "#,
        )
        .await
    }

    /// List user tables, for diagnostics and tests.
    pub async fn list_tables(&self) -> Result<Vec<String>, DieselError> {
        #[derive(QueryableByName)]
        struct TableName {
            #[diesel(sql_type = diesel::sql_types::Text)]
            name: String,
        }

        with_conn!(self.pool, conn => {
            let rows: Vec<TableName> = diesel::sql_query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .load(&mut conn)
            .await?;
            Ok(rows.into_iter().map(|r| r.name).collect())
        })
    }
}
