//! Attribute fallback used when the bandit has nothing to work with.
//!
//! ## Algorithm
//! Tiers are tried in order and the first non-empty one wins:
//! 1. Movies tagged with the context's sub-intent (only if it has one)
//! 2. Movies made for the context's intent (only if it has one)
//! 3. Any well-formed movie
//!
//! The winning tier is sampled down to the target size. Unlike the strict
//! sub-intent path, a sub-intent miss here falls through to later tiers.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{IntentFilter, SubIntentFilter, WellFormedFilter};
use crate::sampling;
use crate::types::FallbackTier;
use data_loader::{CatalogIndex, Context, Movie};
use rand::Rng;
use tracing::{debug, info};

impl FallbackTier {
    /// Whether this tier is considered at all for `context`
    fn applies(self, context: &Context) -> bool {
        match self {
            FallbackTier::SubIntent => context.sub_intent().is_some(),
            FallbackTier::Intent => context.intent().is_some(),
            FallbackTier::AnyMovie => true,
        }
    }
}

/// Tiered attribute-filter selection
pub struct Fallback {
    tiers: Vec<(FallbackTier, FilterPipeline)>,
}

impl Fallback {
    pub fn new() -> Self {
        Self {
            tiers: vec![
                (
                    FallbackTier::SubIntent,
                    FilterPipeline::new().add_filter(SubIntentFilter),
                ),
                (
                    FallbackTier::Intent,
                    FilterPipeline::new().add_filter(IntentFilter),
                ),
                (
                    FallbackTier::AnyMovie,
                    FilterPipeline::new().add_filter(WellFormedFilter),
                ),
            ],
        }
    }

    /// Pick up to `target_count` movies from the first non-empty tier.
    ///
    /// Returns `None` only when no tier matches anything.
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        context: &Context,
        catalog: &'a CatalogIndex,
        target_count: usize,
        rng: &mut R,
    ) -> Option<(FallbackTier, Vec<&'a Movie>)> {
        for (tier, pipeline) in &self.tiers {
            if !tier.applies(context) {
                continue;
            }
            let matching = pipeline.apply(catalog, context);
            if matching.is_empty() {
                debug!("Fallback tier {:?} matched nothing", tier);
                continue;
            }
            info!(
                "Fallback tier {:?}: sampling {} of {} movies",
                tier,
                target_count.min(matching.len()),
                matching.len()
            );
            return Some((*tier, sampling::sample(&matching, target_count, rng)));
        }
        None
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Self::new()
    }
}
