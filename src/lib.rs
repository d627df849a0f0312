//! Alpaca: hotel ingestion and review-driven recommendation pipeline.
//!
//! Hotels are pulled from an upstream travel-data provider (catalog, search
//! detail, sentiment ratings), reviews are gathered from pluggable sources,
//! and an LLM scores each hotel for quality and quiet to produce a verdict.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod recommend;
pub mod repository;
pub mod reviews;
pub mod schema;
pub mod upstream;
pub mod utils;

pub use error::PipelineError;
