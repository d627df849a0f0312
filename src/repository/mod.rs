//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM over SQLite via diesel-async's
//! `SyncConnectionWrapper`.

pub mod diesel_context;
pub mod diesel_hotel;
pub mod diesel_models;
pub mod diesel_recommendation;
pub mod diesel_review;
pub mod pool;
pub mod util;

pub use diesel_context::DbContext;
pub use diesel_hotel::DieselHotelRepository;
pub use diesel_recommendation::{DieselRecommendationRepository, HotelVerdictFields};
pub use diesel_review::DieselReviewRepository;
pub use pool::{DbPool, DieselError};
