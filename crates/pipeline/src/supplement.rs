//! Pads a short result up to the target size.
//!
//! ## Algorithm
//! Titles already in the result are excluded. Tiers are applied only while
//! the result is still short:
//! 1. Same mood tag and intent as the context
//! 2. Same intent, any mood
//! 3. Anything left in the catalog
//!
//! Each tier's matches are shuffled and as many as needed are appended,
//! so the original items keep their order and position at the front.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{IntentFilter, MoodFilter};
use crate::sampling;
use crate::types::{RecommendationSource, RecommendedMovie, SupplementTier};
use data_loader::{CatalogIndex, Context, Movie};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

/// Tiered padding of short results
pub struct Supplementer {
    tiers: Vec<(SupplementTier, FilterPipeline)>,
}

impl Supplementer {
    pub fn new() -> Self {
        Self {
            tiers: vec![
                (
                    SupplementTier::MoodAndIntent,
                    FilterPipeline::new()
                        .add_filter(MoodFilter)
                        .add_filter(IntentFilter),
                ),
                (
                    SupplementTier::Intent,
                    FilterPipeline::new().add_filter(IntentFilter),
                ),
                (SupplementTier::AnyMovie, FilterPipeline::new()),
            ],
        }
    }

    /// Append movies to `current` until it holds `target_count` items or
    /// the catalog runs out. Never introduces a duplicate title.
    pub fn fill<'a, R: Rng + ?Sized>(
        &self,
        mut current: Vec<RecommendedMovie<'a>>,
        context: &Context,
        catalog: &'a CatalogIndex,
        target_count: usize,
        rng: &mut R,
    ) -> Vec<RecommendedMovie<'a>> {
        let mut chosen: HashSet<&'a str> = HashSet::with_capacity(target_count);
        current.retain(|item| chosen.insert(item.title()));
        current.truncate(target_count);

        let original = current.len();
        for (tier, pipeline) in &self.tiers {
            let needed = target_count.saturating_sub(current.len());
            if needed == 0 {
                break;
            }

            let mut pool: Vec<&'a Movie> = pipeline
                .apply(catalog, context)
                .into_iter()
                .filter(|movie| !chosen.contains(movie.title.as_str()))
                .collect();
            debug!("Supplement tier {:?}: {} eligible, {} needed", tier, pool.len(), needed);

            sampling::shuffle(&mut pool, rng);
            for movie in pool.into_iter().take(needed) {
                chosen.insert(&movie.title);
                current.push(RecommendedMovie::new(
                    movie,
                    RecommendationSource::Supplement(*tier),
                ));
            }
        }

        info!(
            "Supplemented with {} additional movies. Total: {}",
            current.len() - original,
            current.len()
        );
        current
    }
}

impl Default for Supplementer {
    fn default() -> Self {
        Self::new()
    }
}
