//! Filter to keep only movies made for the request's intent.

use crate::traits::Filter;
use data_loader::{Context, Movie};

/// Keeps movies whose `intent` equals the context's intent.
pub struct IntentFilter;

impl Filter for IntentFilter {
    fn name(&self) -> &str {
        "IntentFilter"
    }

    fn matches(&self, movie: &Movie, context: &Context) -> bool {
        movie.intent == context.intent
    }
}
