//! Exploration schedule for the epsilon-greedy policy.
//!
//! New contexts explore half the time; the rate decays with the number of
//! views recorded for the context and never drops below the floor:
//!
//! `epsilon = max(floor, initial / (1 + decay * total_views))`

use data_loader::StatBucket;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    /// Rate for a context with no views
    pub initial: f64,
    /// Lower bound the rate decays towards
    pub floor: f64,
    /// Per-view decay factor
    pub decay: f64,
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self {
            initial: 0.5,
            floor: 0.1,
            decay: 0.1,
        }
    }
}

impl ExplorationSchedule {
    /// Exploration probability after `total_views` views
    pub fn epsilon_for_views(&self, total_views: u64) -> f64 {
        (self.initial / (1.0 + self.decay * total_views as f64)).max(self.floor)
    }

    /// Exploration probability for a context bucket; a missing bucket has no views
    pub fn epsilon(&self, bucket: Option<&StatBucket>) -> f64 {
        self.epsilon_for_views(bucket.map_or(0, StatBucket::total_views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::StatEntry;

    #[test]
    fn test_new_context_fully_explores() {
        let schedule = ExplorationSchedule::default();
        assert_eq!(schedule.epsilon_for_views(0), 0.5);
        assert_eq!(schedule.epsilon(None), 0.5);
    }

    #[test]
    fn test_epsilon_is_non_increasing_and_bounded() {
        let schedule = ExplorationSchedule::default();
        let mut previous = schedule.epsilon_for_views(0);
        for views in 1..10_000 {
            let epsilon = schedule.epsilon_for_views(views);
            assert!(epsilon <= previous, "epsilon rose at {views} views");
            assert!(epsilon >= 0.1);
            previous = epsilon;
        }
        assert_eq!(schedule.epsilon_for_views(u64::MAX), 0.1);
    }

    #[test]
    fn test_epsilon_from_bucket_views() {
        let schedule = ExplorationSchedule::default();
        let bucket: StatBucket = [
            ("A", StatEntry::new(10.0, 5)),
            ("B", StatEntry::new(2.0, 5)),
        ]
        .into_iter()
        .collect();

        // 10 views: 0.5 / (1 + 1.0)
        assert!((schedule.epsilon(Some(&bucket)) - 0.25).abs() < 1e-12);
    }
}
