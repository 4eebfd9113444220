//! # Sources Crate
//!
//! Candidate gathering for contextual recommendations.
//!
//! ## Components
//!
//! ### Exact context lookup
//! Titles recorded under the request's own context key. These are the only
//! titles the exploit step trusts.
//!
//! ### Similarity search
//! When the exact context has no statistics, related stored contexts are
//! found by weighted attribute overlap and their titles are unioned.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::CandidateGatherer;
//! use data_loader::{Context, StatisticsStore};
//!
//! let context = Context::new("Positive", "Entertainment", "Sunny", "Evening");
//! let pool = CandidateGatherer::new().gather(&context.key(), &store);
//!
//! if pool.is_empty() {
//!     // use the attribute fallback
//! }
//! ```

// Public modules
pub mod candidates;
pub mod similarity;
pub mod types;

// Re-export commonly used types
pub use candidates::CandidateGatherer;
pub use similarity::{
    DEFAULT_SIMILARITY_THRESHOLD, SimilarContext, SimilaritySearch, SimilarityWeights,
};
pub use types::{Candidate, CandidatePool, CandidateSource};
