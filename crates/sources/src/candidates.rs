//! Candidate gathering
//!
//! Collects the titles the selection policy may choose from:
//! 1. Look up the bucket stored under the request's exact context key
//! 2. If that bucket is missing or empty, union the titles of every
//!    similar context, de-duplicated in first-seen order
//!
//! An empty pool means the caller should use the attribute fallback.

use crate::similarity::SimilaritySearch;
use crate::types::{Candidate, CandidatePool, CandidateSource};
use data_loader::{ContextKey, StatisticsStore};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Gathers candidate titles from a statistics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateGatherer {
    similarity: SimilaritySearch,
}

impl CandidateGatherer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the similar-context search used when the exact context is unknown
    pub fn with_similarity(mut self, similarity: SimilaritySearch) -> Self {
        self.similarity = similarity;
        self
    }

    /// Gather candidates for `key` from `store`
    #[instrument(skip_all, fields(key = %key))]
    pub fn gather<'a>(&self, key: &ContextKey, store: &'a StatisticsStore) -> CandidatePool<'a> {
        if let Some(bucket) = store.bucket(key).filter(|bucket| !bucket.is_empty()) {
            debug!("Exact context hit with {} titles", bucket.len());
            return CandidatePool {
                exact_bucket: Some(bucket),
                candidates: bucket
                    .titles()
                    .map(|title| Candidate::new(title, CandidateSource::ExactContext))
                    .collect(),
                similar_contexts: 0,
            };
        }

        debug!("No exact match for context, using similarity search");
        let similar = self.similarity.find_similar(key, store);

        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut candidates = Vec::new();
        for similar_key in &similar {
            let Some(bucket) = store.bucket(similar_key) else {
                continue;
            };
            for title in bucket.titles() {
                if seen.insert(title) {
                    candidates.push(Candidate::new(title, CandidateSource::SimilarContext));
                }
            }
        }

        debug!(
            "Gathered {} candidates from {} similar contexts",
            candidates.len(),
            similar.len()
        );
        CandidatePool {
            exact_bucket: None,
            candidates,
            similar_contexts: similar.len(),
        }
    }
}
