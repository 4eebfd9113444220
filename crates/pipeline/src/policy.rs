//! The epsilon-greedy selection policy.
//!
//! States are evaluated in priority order:
//! 1. **StrictSubIntent**: a sub-intent request is answered only from movies
//!    tagged with that sub-intent, and is never padded or widened.
//! 2. **NoStatistics**: without a statistics snapshot, use the [`Fallback`].
//! 3. **Gather**: exact context bucket, or the union of similar buckets.
//!    Nothing gathered means [`Fallback`] again.
//! 4. **Explore / Exploit**: one uniform draw against the exact bucket's
//!    epsilon. Explore samples the candidates; exploit ranks exact-bucket
//!    titles by confidence.
//! 5. Titles are resolved against the catalog; unknown titles are dropped.
//! 6. Short results are padded by the [`Supplementer`].

use crate::exploration::ExplorationSchedule;
use crate::fallback::Fallback;
use crate::filter_pipeline::FilterPipeline;
use crate::filters::SubIntentFilter;
use crate::sampling;
use crate::supplement::Supplementer;
use crate::types::{DecisionPath, Recommendation, RecommendationSource, RecommendedMovie};
use data_loader::{CatalogIndex, Context, Movie, StatisticsStore};
use rand::Rng;
use sources::{CandidateGatherer, CandidatePool, CandidateSource};
use tracing::{debug, info, instrument};

/// Number of movies returned per request
pub const DEFAULT_TARGET_COUNT: usize = 10;

/// Chooses the movies to recommend for one context.
///
/// The policy holds no per-request state; the statistics snapshot and RNG
/// are passed to every call.
pub struct SelectionPolicy {
    gatherer: CandidateGatherer,
    schedule: ExplorationSchedule,
    strict: FilterPipeline,
    fallback: Fallback,
    supplementer: Supplementer,
    target_count: usize,
}

impl SelectionPolicy {
    pub fn new() -> Self {
        Self {
            gatherer: CandidateGatherer::new(),
            schedule: ExplorationSchedule::default(),
            strict: FilterPipeline::new().add_filter(SubIntentFilter),
            fallback: Fallback::new(),
            supplementer: Supplementer::new(),
            target_count: DEFAULT_TARGET_COUNT,
        }
    }

    pub fn with_gatherer(mut self, gatherer: CandidateGatherer) -> Self {
        self.gatherer = gatherer;
        self
    }

    pub fn with_schedule(mut self, schedule: ExplorationSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    /// Run the policy for `context`.
    ///
    /// `store` is `None` when no statistics source is available. The result
    /// holds at most `target_count` distinct movies borrowed from `catalog`.
    #[instrument(skip_all, fields(mood = %context.mood, intent = %context.intent))]
    pub fn decide<'a, R: Rng + ?Sized>(
        &self,
        context: &Context,
        store: Option<&StatisticsStore>,
        catalog: &'a CatalogIndex,
        rng: &mut R,
    ) -> Recommendation<'a> {
        if context.sub_intent().is_some() {
            return self.strict_sub_intent(context, catalog, rng);
        }

        let Some(store) = store else {
            info!("No statistics available, using attribute fallback");
            return self.fallback(DecisionPath::NoStatistics, context, catalog, rng);
        };

        let key = context.key();
        let pool = self.gatherer.gather(&key, store);
        if pool.is_empty() {
            info!("No candidates for context {}, using attribute fallback", key);
            return self.fallback(DecisionPath::NoCandidates, context, catalog, rng);
        }

        let epsilon = self.schedule.epsilon(pool.exact_bucket);
        let draw: f64 = rng.random();
        let (path, chosen) = if draw < epsilon {
            info!("Exploring (epsilon {:.3}) over {} candidates", epsilon, pool.len());
            (DecisionPath::Explore, self.explore(&pool, rng))
        } else {
            info!("Exploiting (epsilon {:.3}) over {} candidates", epsilon, pool.len());
            (DecisionPath::Exploit, self.exploit(&pool))
        };

        let resolved: Vec<RecommendedMovie<'a>> = chosen
            .into_iter()
            .filter_map(|(title, source)| match catalog.by_title(title) {
                Some(movie) => Some(RecommendedMovie::new(movie, source)),
                None => {
                    debug!("Dropping '{}': not in catalog", title);
                    None
                }
            })
            .collect();

        let resolved_count = resolved.len();
        let items = if resolved_count < self.target_count {
            self.supplementer
                .fill(resolved, context, catalog, self.target_count, rng)
        } else {
            resolved
        };

        Recommendation {
            supplemented: items.len().saturating_sub(resolved_count),
            items,
            path,
            epsilon: Some(epsilon),
            candidate_count: pool.len(),
        }
    }

    fn strict_sub_intent<'a, R: Rng + ?Sized>(
        &self,
        context: &Context,
        catalog: &'a CatalogIndex,
        rng: &mut R,
    ) -> Recommendation<'a> {
        let matching = self.strict.apply(catalog, context);
        info!(
            "Sub-intent request: {} matching movies, statistics bypassed",
            matching.len()
        );

        let mut recommendation = Recommendation::empty(DecisionPath::StrictSubIntent);
        recommendation.items = sampling::sample(&matching, self.target_count, rng)
            .into_iter()
            .map(|movie| RecommendedMovie::new(movie, RecommendationSource::StrictSubIntent))
            .collect();
        recommendation
    }

    fn fallback<'a, R: Rng + ?Sized>(
        &self,
        path: DecisionPath,
        context: &Context,
        catalog: &'a CatalogIndex,
        rng: &mut R,
    ) -> Recommendation<'a> {
        let mut recommendation = Recommendation::empty(path);
        if let Some((tier, movies)) = self.fallback.select(context, catalog, self.target_count, rng) {
            recommendation.items = movies
                .into_iter()
                .map(|movie| RecommendedMovie::new(movie, RecommendationSource::Fallback(tier)))
                .collect();
        }
        recommendation
    }

    fn explore<'a, R: Rng + ?Sized>(
        &self,
        pool: &CandidatePool<'a>,
        rng: &mut R,
    ) -> Vec<(&'a str, RecommendationSource)> {
        sampling::sample(&pool.candidates, self.target_count, rng)
            .into_iter()
            .map(|candidate| (candidate.title, RecommendationSource::Explore))
            .collect()
    }

    /// Exact-bucket candidates ranked by confidence, best first.
    ///
    /// Ties keep bucket order. Titles only reachable through a similar
    /// context are never ranked.
    fn exploit<'a>(&self, pool: &CandidatePool<'a>) -> Vec<(&'a str, RecommendationSource)> {
        let Some(bucket) = pool.exact_bucket else {
            debug!("No exact statistics to exploit");
            return Vec::new();
        };

        let mut scored: Vec<(&'a str, f64)> = pool
            .candidates
            .iter()
            .filter(|candidate| candidate.source == CandidateSource::ExactContext)
            .filter_map(|candidate| {
                bucket
                    .get(candidate.title)
                    .map(|entry| (candidate.title, entry.confidence()))
            })
            .filter(|(title, confidence)| {
                let usable = !confidence.is_nan();
                if !usable {
                    debug!("Not ranking '{}': confidence is NaN", title);
                }
                usable
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.target_count);

        scored
            .into_iter()
            .map(|(title, confidence)| (title, RecommendationSource::Exploit { confidence }))
            .collect()
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Titles-only entry point: run the default policy with `target_count` and
/// return owned movies in result order.
pub fn recommend<R: Rng + ?Sized>(
    context: &Context,
    store: Option<&StatisticsStore>,
    catalog: &CatalogIndex,
    target_count: usize,
    rng: &mut R,
) -> Vec<Movie> {
    SelectionPolicy::new()
        .with_target_count(target_count)
        .decide(context, store, catalog, rng)
        .to_movies()
}
