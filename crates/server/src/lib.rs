//! Server crate for the mood-based recommender.
//!
//! This crate contains the configuration and the async service that wraps
//! the selection policy: per-request statistics loading, RNG setup and
//! conversion to owned results.

pub mod config;
pub mod service;

pub use config::RecommenderConfig;
pub use service::{MovieRecommendation, RecommendationOutcome, RecommendationService};
