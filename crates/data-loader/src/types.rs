//! Core domain types: catalog movies, per-context reward statistics,
//! and the in-memory catalog index.

use crate::context::ContextKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

// =============================================================================
// Movie
// =============================================================================

fn default_intent() -> String {
    "Entertainment".to_string()
}

fn default_mood_tag() -> String {
    "Neutral".to_string()
}

/// A catalog item.
///
/// `title` is the catalog key. Attributes the recommender does not look
/// at (poster, genre, year, ...) are kept in `attributes` so they reach
/// the caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default = "default_intent")]
    pub intent: String,
    #[serde(default = "default_mood_tag")]
    pub mood_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Movie {
    pub fn new(
        title: impl Into<String>,
        intent: impl Into<String>,
        mood_tag: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            intent: intent.into(),
            mood_tag: mood_tag.into(),
            sub_intent: None,
            description: None,
            url: None,
            attributes: Map::new(),
        }
    }

    pub fn with_sub_intent(mut self, sub_intent: impl Into<String>) -> Self {
        self.sub_intent = Some(sub_intent.into());
        self
    }

    /// The sub-intent tag, ignoring empty strings
    pub fn sub_intent(&self) -> Option<&str> {
        self.sub_intent.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Reward statistics
// =============================================================================

/// Accumulated feedback for one title within one context
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Sum of rewards, non-negative by convention
    #[serde(default)]
    pub reward: f64,
    /// Number of recorded views
    #[serde(default)]
    pub count: u64,
}

impl StatEntry {
    pub fn new(reward: f64, count: u64) -> Self {
        Self { reward, count }
    }

    /// Mean reward per view; a zero count is treated as one view
    pub fn avg_reward(&self) -> f64 {
        self.reward / self.count.max(1) as f64
    }

    /// Average reward discounted by how few views back it up.
    ///
    /// `avg_reward * (1 - 1 / (1 + count))`: zero at zero views, approaching
    /// the plain average as views accumulate.
    pub fn confidence(&self) -> f64 {
        self.avg_reward() * (1.0 - 1.0 / (1.0 + self.count as f64))
    }
}

/// All statistics recorded for one context, keyed by title.
///
/// Iteration follows insertion order (document order when parsed), which
/// is what exploit ranking uses to break ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatBucket {
    pub(crate) entries: Vec<(String, StatEntry)>,
    pub(crate) positions: HashMap<String, usize>,
}

impl StatBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `title`; a replaced entry keeps its position
    pub fn insert(&mut self, title: impl Into<String>, entry: StatEntry) {
        let title = title.into();
        match self.positions.get(&title) {
            Some(&pos) => self.entries[pos].1 = entry,
            None => {
                self.positions.insert(title.clone(), self.entries.len());
                self.entries.push((title, entry));
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&StatEntry> {
        self.positions.get(title).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.positions.contains_key(title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatEntry)> {
        self.entries.iter().map(|(title, entry)| (title.as_str(), entry))
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(title, _)| title.as_str())
    }

    /// Sum of view counts over every title in the bucket
    pub fn total_views(&self) -> u64 {
        self.entries.iter().map(|(_, entry)| entry.count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Into<String>> FromIterator<(T, StatEntry)> for StatBucket {
    fn from_iter<I: IntoIterator<Item = (T, StatEntry)>>(iter: I) -> Self {
        let mut bucket = StatBucket::new();
        for (title, entry) in iter {
            bucket.insert(title, entry);
        }
        bucket
    }
}

/// Read-only snapshot of reward statistics, keyed by context.
///
/// Written by an external aggregation job; the recommender only reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsStore {
    pub(crate) contexts: Vec<(ContextKey, StatBucket)>,
    pub(crate) positions: HashMap<ContextKey, usize>,
}

impl StatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the bucket for `key`
    pub fn insert(&mut self, key: impl Into<ContextKey>, bucket: StatBucket) {
        let key = key.into();
        match self.positions.get(&key) {
            Some(&pos) => self.contexts[pos].1 = bucket,
            None => {
                self.positions.insert(key.clone(), self.contexts.len());
                self.contexts.push((key, bucket));
            }
        }
    }

    /// Bucket stored under `key`, if any
    pub fn bucket(&self, key: &ContextKey) -> Option<&StatBucket> {
        self.positions.get(key).map(|&pos| &self.contexts[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContextKey, &StatBucket)> {
        self.contexts.iter().map(|(key, bucket)| (key, bucket))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ContextKey> {
        self.contexts.iter().map(|(key, _)| key)
    }

    /// Number of contexts in the store
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

// =============================================================================
// CatalogIndex
// =============================================================================

/// Immutable in-memory catalog with O(1) lookup by title.
///
/// Built once at startup and shared behind an `Arc`. If the source data
/// repeats a title, the last record wins but keeps the slot of the first,
/// so `all()` never yields a title twice.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    pub(crate) movies: Vec<Movie>,
    pub(crate) by_title: HashMap<String, usize>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a list of movies
    pub fn from_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let mut index = Self::new();
        for movie in movies {
            index.insert_movie(movie);
        }
        index
    }

    pub fn insert_movie(&mut self, movie: Movie) {
        match self.by_title.get(&movie.title) {
            Some(&pos) => self.movies[pos] = movie,
            None => {
                self.by_title.insert(movie.title.clone(), self.movies.len());
                self.movies.push(movie);
            }
        }
    }

    /// Get a movie by its title
    pub fn by_title(&self, title: &str) -> Option<&Movie> {
        self.by_title.get(title).map(|&pos| &self.movies[pos])
    }

    /// Every movie matching `predicate`, in catalog order
    pub fn filter<P>(&self, mut predicate: P) -> Vec<&Movie>
    where
        P: FnMut(&Movie) -> bool,
    {
        self.movies.iter().filter(|movie| predicate(*movie)).collect()
    }

    pub fn all(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
