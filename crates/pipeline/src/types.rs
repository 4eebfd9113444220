//! Decision outputs of the selection policy.

use data_loader::Movie;
use std::fmt;

/// Which fallback tier produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackTier {
    /// Catalog movies tagged with the context's sub-intent
    SubIntent,
    /// Catalog movies made for the context's intent
    Intent,
    /// Any well-formed catalog movie
    AnyMovie,
}

/// Which supplementation tier padded a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplementTier {
    /// Same mood tag and intent as the context
    MoodAndIntent,
    /// Same intent, any mood
    Intent,
    /// Anything not yet chosen
    AnyMovie,
}

/// Why a particular movie is in the result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecommendationSource {
    StrictSubIntent,
    Fallback(FallbackTier),
    Explore,
    Exploit { confidence: f64 },
    Supplement(SupplementTier),
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrictSubIntent => write!(f, "sub-intent match"),
            Self::Fallback(tier) => write!(f, "fallback ({:?})", tier),
            Self::Explore => write!(f, "exploration"),
            Self::Exploit { confidence } => write!(f, "exploitation (confidence {:.3})", confidence),
            Self::Supplement(tier) => write!(f, "supplement ({:?})", tier),
        }
    }
}

/// The branch of the policy that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionPath {
    /// Sub-intent requests bypass the bandit entirely
    StrictSubIntent,
    /// No statistics source; attribute fallback
    NoStatistics,
    /// Statistics exist but neither the exact nor any similar context had titles
    NoCandidates,
    Explore,
    Exploit,
}

/// One recommended movie, borrowed from the catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendedMovie<'a> {
    pub movie: &'a Movie,
    pub source: RecommendationSource,
}

impl<'a> RecommendedMovie<'a> {
    pub fn new(movie: &'a Movie, source: RecommendationSource) -> Self {
        Self { movie, source }
    }

    pub fn title(&self) -> &'a str {
        &self.movie.title
    }
}

/// Full outcome of one decision
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    /// At most `target_count` distinct movies, best first on the exploit path
    pub items: Vec<RecommendedMovie<'a>>,
    pub path: DecisionPath,
    /// Exploration rate used, when the bandit ran
    pub epsilon: Option<f64>,
    /// Size of the candidate pool the bandit chose from
    pub candidate_count: usize,
    /// How many items the supplementation step added
    pub supplemented: usize,
}

impl<'a> Recommendation<'a> {
    pub fn empty(path: DecisionPath) -> Self {
        Self {
            items: Vec::new(),
            path,
            epsilon: None,
            candidate_count: 0,
            supplemented: 0,
        }
    }

    pub fn titles(&self) -> Vec<&'a str> {
        self.items.iter().map(RecommendedMovie::title).collect()
    }

    /// Owned copies of the recommended movies, in order
    pub fn to_movies(&self) -> Vec<Movie> {
        self.items.iter().map(|item| item.movie.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
