//! Selection policy for contextual movie recommendations.
//!
//! This crate provides:
//! - Filter trait and attribute filters over the catalog
//! - FilterPipeline for composing filters
//! - ExplorationSchedule for the decaying exploration rate
//! - Fallback and Supplementer for attribute-based selection and padding
//! - SelectionPolicy, the epsilon-greedy decision itself
//!
//! ## Architecture
//! A decision runs in stages:
//! 1. Sub-intent requests are answered by filtering alone
//! 2. Candidates are gathered from the statistics snapshot (`sources`)
//! 3. The policy explores or exploits over those candidates
//! 4. Short results are padded from the catalog
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::SelectionPolicy;
//! use rand::SeedableRng;
//!
//! let policy = SelectionPolicy::new().with_target_count(10);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let result = policy.decide(&context, store.as_ref(), &catalog, &mut rng);
//! for item in &result.items {
//!     println!("{} ({})", item.title(), item.source);
//! }
//! ```

pub mod exploration;
pub mod fallback;
pub mod filter_pipeline;
pub mod filters;
pub mod policy;
pub mod sampling;
pub mod supplement;
pub mod traits;
pub mod types;

// Re-export main types
pub use exploration::ExplorationSchedule;
pub use fallback::Fallback;
pub use filter_pipeline::FilterPipeline;
pub use policy::{DEFAULT_TARGET_COUNT, SelectionPolicy, recommend};
pub use supplement::Supplementer;
pub use traits::Filter;
pub use types::{
    DecisionPath, FallbackTier, Recommendation, RecommendationSource, RecommendedMovie,
    SupplementTier,
};
