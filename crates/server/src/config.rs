//! Service configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "stats_path": "/var/lib/recs/bandit_stats.json", "seed": 7 }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pipeline::{DEFAULT_TARGET_COUNT, ExplorationSchedule};
use serde::{Deserialize, Serialize};
use sources::DEFAULT_SIMILARITY_THRESHOLD;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Movie catalog (JSON array)
    pub catalog_path: PathBuf,
    /// Per-context reward statistics; re-read on every request
    pub stats_path: PathBuf,
    /// Movies returned per request
    pub target_count: usize,
    /// Seed for every request's RNG; `None` draws from the thread RNG
    pub seed: Option<u64>,
    pub exploration: ExplorationSchedule,
    /// Stored contexts must score strictly above this, in hundredths, to
    /// count as similar
    pub similarity_threshold: u32,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/movies.json"),
            stats_path: PathBuf::from("data/bandit_stats.json"),
            target_count: DEFAULT_TARGET_COUNT,
            seed: None,
            exploration: ExplorationSchedule::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl RecommenderConfig {
    /// Read a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_stats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_path = path.into();
        self
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_exploration(mut self, exploration: ExplorationSchedule) -> Self {
        self.exploration = exploration;
        self
    }
}
