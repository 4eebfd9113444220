//! Filter to keep only records usable as recommendations.

use crate::traits::Filter;
use data_loader::{Context, Movie};

/// Keeps movies with a non-blank title.
///
/// The loader already drops untitled records; this guards catalogs built
/// in memory.
pub struct WellFormedFilter;

impl Filter for WellFormedFilter {
    fn name(&self) -> &str {
        "WellFormedFilter"
    }

    fn matches(&self, movie: &Movie, _context: &Context) -> bool {
        !movie.title.trim().is_empty()
    }
}
