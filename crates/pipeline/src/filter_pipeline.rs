//! The FilterPipeline chains catalog filters.
//!
//! A movie passes the pipeline when it passes every filter in it; an empty
//! pipeline passes the whole catalog.

use crate::traits::Filter;
use data_loader::{CatalogIndex, Context, Movie};
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(MoodFilter)
///     .add_filter(IntentFilter);
///
/// let matching = pipeline.apply(&catalog, &context);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Apply all filters in sequence to the catalog.
    ///
    /// Returns matching movies in catalog order.
    pub fn apply<'a>(&self, catalog: &'a CatalogIndex, context: &Context) -> Vec<&'a Movie> {
        let mut current: Vec<&'a Movie> = catalog.all().iter().collect();
        for filter in &self.filters {
            let before = current.len();
            current.retain(|movie| filter.matches(movie, context));
            debug!(
                "Filter applied: {} ({} -> {})",
                filter.name(),
                before,
                current.len()
            );
        }
        current
    }

    /// Names of the filters, in order
    pub fn describe(&self) -> Vec<&str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
