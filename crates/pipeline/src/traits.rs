//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that lets catalog predicates be
//! composed into the fallback and supplementation tiers.

use data_loader::{Context, Movie};

/// A predicate over catalog movies for a given request context.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared by concurrent decisions
/// - Filters only inspect; the catalog is never modified
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `movie` passes this filter for `context`
    fn matches(&self, movie: &Movie, context: &Context) -> bool;
}
