//! Filter to keep only movies whose mood tag fits the request's mood.

use crate::traits::Filter;
use data_loader::{Context, Movie};

/// Keeps movies whose `mood_tag` equals the context's mood.
pub struct MoodFilter;

impl Filter for MoodFilter {
    fn name(&self) -> &str {
        "MoodFilter"
    }

    fn matches(&self, movie: &Movie, context: &Context) -> bool {
        movie.mood_tag == context.mood
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_filter() {
        let context = Context::new("Negative", "Entertainment", "Rainy", "Night");
        assert!(MoodFilter.matches(&Movie::new("Heat", "Entertainment", "Negative"), &context));
        assert!(!MoodFilter.matches(&Movie::new("Up", "Entertainment", "Positive"), &context));
    }
}
