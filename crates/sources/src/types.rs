//! Candidate types shared by the gathering step and the selection policy.

use data_loader::StatBucket;

/// Where a candidate title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// Listed in the bucket of the request's own context
    ExactContext,
    /// Only found through a similar stored context
    SimilarContext,
}

/// A title eligible for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub title: &'a str,
    pub source: CandidateSource,
}

impl<'a> Candidate<'a> {
    pub fn new(title: &'a str, source: CandidateSource) -> Self {
        Self { title, source }
    }
}

/// Result of candidate gathering for one request.
///
/// Borrows from the statistics snapshot it was gathered from.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool<'a> {
    /// Bucket of the exact context. `None` when the store has no entries for it.
    pub exact_bucket: Option<&'a StatBucket>,
    /// De-duplicated titles in first-seen order
    pub candidates: Vec<Candidate<'a>>,
    /// Number of similar contexts the titles were drawn from (0 on an exact hit)
    pub similar_contexts: usize,
}

impl<'a> CandidatePool<'a> {
    pub fn titles(&self) -> impl Iterator<Item = &'a str> {
        self.candidates.iter().map(|c| c.title)
    }

    /// True when the exact context supplied the candidates
    pub fn is_exact(&self) -> bool {
        self.exact_bucket.is_some()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
