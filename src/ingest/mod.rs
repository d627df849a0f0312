//! Upstream ingestion stages: catalog listing and per-hotel detail.

mod catalog;
mod details;

pub use catalog::{CatalogSummary, HotelCatalogFetcher};
pub use details::{DetailFetcher, DetailOutcome, StageSummary};
