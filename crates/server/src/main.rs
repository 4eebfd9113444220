//! Simple test harness for the recommendation service.
//!
//! Runs a handful of representative contexts end to end. Pass a JSON config
//! file as the first argument to override the default data paths.

use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::Context;
use server::{RecommendationService, RecommenderConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug,pipeline=debug")),
        )
        .init();

    info!("Starting recommender test harness");

    let config = match std::env::args().nth(1) {
        Some(path) => RecommenderConfig::from_file(Path::new(&path))?,
        None => RecommenderConfig::default(),
    };
    info!("Using catalog {:?} and statistics {:?}", config.catalog_path, config.stats_path);

    let service = RecommendationService::new(config).await?;
    info!(
        "Serving {} movies, {} per request",
        service.catalog().len(),
        service.config().target_count
    );

    let contexts = [
        Context::new("Positive", "Entertainment", "Sunny", "Evening"),
        Context::new("Negative", "Relaxation", "Rainy", "Night"),
        Context::new("Neutral", "Focus", "Cloudy", "Morning").with_sub_intent("Workout"),
    ];

    for context in contexts {
        info!("Context: {}", context.key());
        let outcome = service.recommend(context).await?;
        info!(
            "Received {} recommendations via {:?} (epsilon: {})",
            outcome.recommendations.len(),
            outcome.path,
            outcome
                .epsilon
                .map(|e| format!("{:.3}", e))
                .unwrap_or_else(|| "n/a".to_string())
        );
        for rec in &outcome.recommendations {
            info!("{}. {} [{}]", rec.rank, rec.movie.title, rec.source);
            info!("   {}", rec.explanation);
        }
    }

    Ok(())
}
