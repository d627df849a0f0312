//! Domain models for hotels, reviews, and recommendations.

mod hotel;
mod recommendation;
mod review;

pub use hotel::{Hotel, RatingSource};
pub use recommendation::HotelRecommendation;
pub use review::{HotelReview, ReviewSourceKind};
