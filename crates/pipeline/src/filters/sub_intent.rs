//! Filter to keep only movies tagged with the request's sub-intent.

use crate::traits::Filter;
use data_loader::{Context, Movie};

/// Keeps movies whose `sub_intent` equals the context's.
///
/// A context without a sub-intent matches nothing.
pub struct SubIntentFilter;

impl Filter for SubIntentFilter {
    fn name(&self) -> &str {
        "SubIntentFilter"
    }

    fn matches(&self, movie: &Movie, context: &Context) -> bool {
        match context.sub_intent() {
            Some(wanted) => movie.sub_intent() == Some(wanted),
            None => false,
        }
    }
}
