//! Loading and querying the catalog index.
//!
//! The catalog and the statistics store live in separate files and are
//! parsed in parallel with `rayon::join`. The catalog is loaded once per
//! process; the statistics store is re-read for every decision by callers
//! that want fresh numbers.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info, warn};

impl CatalogIndex {
    /// Load and validate the catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let movies = parser::parse_catalog_file(path)?;
        let parsed = movies.len();
        let index = Self::from_movies(movies);

        if index.len() < parsed {
            warn!(
                "Catalog {:?} repeats {} title(s); later records replaced earlier ones",
                path,
                parsed - index.len()
            );
        }

        index.validate()?;
        info!("Loaded {} movies from {:?}", index.len(), path);
        Ok(index)
    }

    /// Startup precondition: a catalog with no movies cannot serve anything
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(DataLoadError::EmptyCatalog);
        }
        Ok(())
    }

    /// Case-insensitive title search.
    ///
    /// Exact matches come first, then substring matches, each group in
    /// catalog order.
    pub fn search(&self, query: &str) -> Vec<&Movie> {
        let query = query.to_lowercase();
        let mut exact = Vec::new();
        let mut partial = Vec::new();

        for movie in &self.movies {
            let title = movie.title.to_lowercase();
            if title == query {
                exact.push(movie);
            } else if title.contains(&query) {
                partial.push(movie);
            }
        }

        exact.extend(partial);
        exact
    }
}

impl StatisticsStore {
    /// Load a statistics snapshot.
    ///
    /// Fails with `MissingStatisticsSource` when the file does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let store = parser::parse_statistics_file(path)?;
        debug!("Loaded statistics for {} contexts from {:?}", store.len(), path);
        Ok(store)
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing source
    /// becomes `None` instead of an error
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        match Self::load_from_file(path) {
            Ok(store) => Ok(Some(store)),
            Err(DataLoadError::MissingStatisticsSource { path }) => {
                warn!("No statistics source at {}; recommendations will use fallback", path);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Load the catalog and an optional statistics snapshot in parallel
pub fn load_from_files(
    catalog_path: &Path,
    stats_path: &Path,
) -> Result<(CatalogIndex, Option<StatisticsStore>)> {
    let (catalog, stats) = rayon::join(
        || CatalogIndex::load_from_file(catalog_path),
        || StatisticsStore::load_optional(stats_path),
    );
    Ok((catalog?, stats?))
}
