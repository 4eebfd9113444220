//! # Data Loader Crate
//!
//! Loading and indexing for the contextual recommender.
//!
//! ## Main Components
//!
//! - **context**: `Context`, `ContextKey`, and the key codec
//! - **types**: `Movie`, `StatEntry`, `StatBucket`, `StatisticsStore`, `CatalogIndex`
//! - **parser**: JSON parsing for the catalog and statistics files
//! - **index**: Loading, validation and search over the catalog
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{load_from_files, Context};
//! use std::path::Path;
//!
//! let (catalog, stats) = load_from_files(
//!     Path::new("data/movies.json"),
//!     Path::new("data/bandit_stats.json"),
//! )?;
//!
//! let context = Context::new("Positive", "Entertainment", "Sunny", "Evening");
//! let bucket = stats.as_ref().and_then(|s| s.bucket(&context.key()));
//! ```

// Public modules
pub mod context;
pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use context::{Context, ContextFields, ContextKey, KEY_DELIMITER, KEY_FIELD_COUNT};
pub use error::{DataLoadError, Result};
pub use index::load_from_files;
pub use types::{CatalogIndex, Movie, StatBucket, StatEntry, StatisticsStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_index_creation() {
        let index = CatalogIndex::new();
        assert!(index.is_empty());
        assert!(index.all().is_empty());
        assert!(index.by_title("anything").is_none());
    }

    #[test]
    fn test_stat_entry_confidence() {
        let a = StatEntry::new(10.0, 5);
        let b = StatEntry::new(2.0, 1);

        assert!((a.confidence() - 10.0 / 6.0).abs() < 1e-9);
        assert!((b.confidence() - 1.0).abs() < 1e-9);
        assert!(a.confidence() > b.confidence());
    }

    #[test]
    fn test_stat_entry_zero_count() {
        let entry = StatEntry::new(3.0, 0);
        assert_eq!(entry.avg_reward(), 3.0);
        assert_eq!(entry.confidence(), 0.0);
    }

    #[test]
    fn test_bucket_insert_replaces_in_place() {
        let mut bucket = StatBucket::new();
        bucket.insert("A", StatEntry::new(1.0, 1));
        bucket.insert("B", StatEntry::new(1.0, 1));
        bucket.insert("A", StatEntry::new(9.0, 3));

        let titles: Vec<&str> = bucket.titles().collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(bucket.get("A").unwrap().count, 3);
        assert_eq!(bucket.total_views(), 4);
    }
}
