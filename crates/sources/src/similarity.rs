//! Similar-context search
//!
//! Used when the request's exact context has no statistics. Every stored
//! key is compared with the request by weighted attribute overlap:
//!
//! | attribute   | weight |
//! |-------------|--------|
//! | mood        | 0.40   |
//! | intent      | 0.30   |
//! | sub_intent  | 0.15 (only when the request has one) |
//! | weather     | 0.10   |
//! | time_of_day | 0.05   |
//!
//! A stored context is similar when its score is strictly above 0.40, so
//! mood alone is not enough but mood plus any other attribute is.
//! Weights are kept in hundredths so the threshold comparison is exact.

use data_loader::{ContextFields, ContextKey, StatisticsStore};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Default qualifying threshold, in hundredths
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 40;

/// Attribute weights, in hundredths of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityWeights {
    pub mood: u32,
    pub intent: u32,
    pub sub_intent: u32,
    pub weather: u32,
    pub time_of_day: u32,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            mood: 40,
            intent: 30,
            sub_intent: 15,
            weather: 10,
            time_of_day: 5,
        }
    }
}

impl SimilarityWeights {
    /// Overlap score in hundredths.
    ///
    /// The sub-intent term only counts when both sides carry the same
    /// non-empty value, which keeps the score symmetric.
    pub fn score(&self, a: &ContextFields<'_>, b: &ContextFields<'_>) -> u32 {
        let mut score = 0;
        if a.mood == b.mood {
            score += self.mood;
        }
        if a.intent == b.intent {
            score += self.intent;
        }
        if !a.sub_intent.is_empty() && a.sub_intent == b.sub_intent {
            score += self.sub_intent;
        }
        if a.weather == b.weather {
            score += self.weather;
        }
        if a.time_of_day == b.time_of_day {
            score += self.time_of_day;
        }
        score
    }

    pub fn total(&self) -> u32 {
        self.mood + self.intent + self.sub_intent + self.weather + self.time_of_day
    }
}

/// A stored context that qualified as similar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarContext<'a> {
    pub key: &'a ContextKey,
    /// Overlap score in `[0, 1]`
    pub score: f64,
}

/// Finds stored contexts related to a request context
#[derive(Debug, Clone, Copy)]
pub struct SimilaritySearch {
    weights: SimilarityWeights,
    /// Scores must be strictly above this (hundredths)
    threshold: u32,
}

impl Default for SimilaritySearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilaritySearch {
    pub fn new() -> Self {
        Self {
            weights: SimilarityWeights::default(),
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Configure the qualifying threshold in hundredths (default: 40)
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Score two decoded contexts, normalised to `[0, 1]`
    pub fn score(&self, a: &ContextFields<'_>, b: &ContextFields<'_>) -> f64 {
        f64::from(self.weights.score(a, b)) / 100.0
    }

    /// Every stored context scoring above the threshold, with its score.
    ///
    /// Results follow store order. Malformed stored keys are skipped; a
    /// malformed query key matches nothing.
    pub fn similar_contexts_scored<'a>(
        &self,
        query: &ContextKey,
        store: &'a StatisticsStore,
    ) -> Vec<SimilarContext<'a>> {
        let query_fields = match query.decode() {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Cannot search for similar contexts: {}", e);
                return Vec::new();
            }
        };

        let keys: Vec<&ContextKey> = store.keys().collect();
        let similar: Vec<SimilarContext<'a>> = keys
            .par_iter()
            .filter_map(|&key| {
                let fields = match key.decode() {
                    Ok(fields) => fields,
                    Err(e) => {
                        debug!("Skipping stored context: {}", e);
                        return None;
                    }
                };
                let score = self.weights.score(&query_fields, &fields);
                (score > self.threshold).then(|| SimilarContext {
                    key,
                    score: f64::from(score) / 100.0,
                })
            })
            .collect();

        debug!(
            "Found {} similar contexts for '{}' among {} stored",
            similar.len(),
            query,
            keys.len()
        );
        similar
    }

    /// Keys of every stored context similar to `query`
    pub fn find_similar<'a>(&self, query: &ContextKey, store: &'a StatisticsStore) -> Vec<&'a ContextKey> {
        self.similar_contexts_scored(query, store)
            .into_iter()
            .map(|similar| similar.key)
            .collect()
    }
}
