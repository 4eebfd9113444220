//! Example: Gather candidates for a context
//!
//! Run with: cargo run --package sources --example gather_candidates
//!
//! This example shows how to:
//! 1. Load the statistics store
//! 2. Gather candidates for an exact context
//! 3. Gather candidates for an unseen context through similarity search

use data_loader::{Context, StatisticsStore};
use sources::{CandidateGatherer, SimilaritySearch};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,sources=debug")
        .init();

    println!("=== Candidate Gathering Example ===\n");

    let start = Instant::now();
    let store = StatisticsStore::load_from_file(Path::new("data/bandit_stats.json"))?;
    println!("Loaded {} contexts in {:?}\n", store.len(), start.elapsed());

    let gatherer = CandidateGatherer::new();
    let contexts = [
        Context::new("Positive", "Entertainment", "Sunny", "Evening"),
        Context::new("Positive", "Entertainment", "Foggy", "Dusk"),
    ];

    for context in &contexts {
        let key = context.key();
        let start = Instant::now();
        let pool = gatherer.gather(&key, &store);
        println!(
            "{} -> {} candidates ({}) in {:?}",
            key,
            pool.len(),
            if pool.is_exact() {
                "exact".to_string()
            } else {
                format!("{} similar contexts", pool.similar_contexts)
            },
            start.elapsed()
        );
        for title in pool.titles().take(5) {
            println!("  - {}", title);
        }
    }

    println!("\nSimilar contexts for the unseen context:");
    let search = SimilaritySearch::new();
    for similar in search.similar_contexts_scored(&contexts[1].key(), &store) {
        println!("  {:.2}  {}", similar.score, similar.key);
    }

    Ok(())
}
