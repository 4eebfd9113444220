//! # Recommendation Service
//!
//! Async front of the selection policy:
//! 1. Load a fresh statistics snapshot
//! 2. Run the policy against the shared catalog
//! 3. Convert the borrowed result into owned recommendations
//!
//! Steps 1 and 2 run together on tokio's blocking pool. Each call owns its
//! snapshot and RNG, so one service value can serve concurrent requests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RecommenderConfig;
use data_loader::{CatalogIndex, Context, Movie, StatisticsStore};
use pipeline::{DecisionPath, Recommendation, RecommendationSource, SelectionPolicy};
use sources::{CandidateGatherer, SimilaritySearch};

/// One recommended movie, owned and ready to hand to a caller
#[derive(Debug, Clone, Serialize)]
pub struct MovieRecommendation {
    pub movie: Movie,
    /// 1-based position in the result
    pub rank: usize,
    #[serde(skip)]
    pub source: RecommendationSource,
    /// Exploit confidence, when the movie was ranked by it
    pub score: Option<f64>,
    pub explanation: String,
}

/// Result of one service call
#[derive(Debug, Clone)]
pub struct RecommendationOutcome {
    pub recommendations: Vec<MovieRecommendation>,
    pub path: DecisionPath,
    pub epsilon: Option<f64>,
    pub candidate_count: usize,
    pub supplemented: usize,
    pub elapsed: Duration,
}

impl RecommendationOutcome {
    pub fn titles(&self) -> Vec<&str> {
        self.recommendations
            .iter()
            .map(|rec| rec.movie.title.as_str())
            .collect()
    }
}

/// Shared, cloneable recommendation service
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<CatalogIndex>,
    policy: Arc<SelectionPolicy>,
    config: Arc<RecommenderConfig>,
}

impl RecommendationService {
    /// Load the catalog named by `config` and build the service.
    ///
    /// An empty or unreadable catalog is a startup error.
    pub async fn new(config: RecommenderConfig) -> Result<Self> {
        let catalog_path = config.catalog_path.clone();
        let catalog = tokio::task::spawn_blocking(move || CatalogIndex::load_from_file(&catalog_path))
            .await
            .context("Catalog loading task panicked")?
            .with_context(|| format!("Failed to load catalog from {:?}", config.catalog_path))?;
        info!("Catalog loaded: {} movies", catalog.len());

        Ok(Self::from_catalog(Arc::new(catalog), config))
    }

    /// Build the service around an already loaded catalog
    pub fn from_catalog(catalog: Arc<CatalogIndex>, config: RecommenderConfig) -> Self {
        let gatherer = CandidateGatherer::new()
            .with_similarity(SimilaritySearch::new().with_threshold(config.similarity_threshold));
        let policy = SelectionPolicy::new()
            .with_gatherer(gatherer)
            .with_schedule(config.exploration)
            .with_target_count(config.target_count);
        Self {
            catalog,
            policy: Arc::new(policy),
            config: Arc::new(config),
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.catalog
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Recommend movies for `context` against the current statistics file
    pub async fn recommend(&self, context: Context) -> Result<RecommendationOutcome> {
        let start_time = Instant::now();
        let service = self.clone();

        let mut outcome = tokio::task::spawn_blocking(move || {
            let store = service.load_statistics();
            service.decide(&context, store.as_ref())
        })
        .await
        .context("Recommendation task panicked")?;

        outcome.elapsed = start_time.elapsed();
        info!(
            "Recommended {} movies via {:?} in {:.2?}",
            outcome.recommendations.len(),
            outcome.path,
            outcome.elapsed
        );
        Ok(outcome)
    }

    /// Recommend against a snapshot the caller already holds
    pub async fn recommend_with_snapshot(
        &self,
        context: Context,
        snapshot: Option<Arc<StatisticsStore>>,
    ) -> Result<RecommendationOutcome> {
        let start_time = Instant::now();
        let service = self.clone();

        let mut outcome = tokio::task::spawn_blocking(move || {
            service.decide(&context, snapshot.as_deref())
        })
        .await
        .context("Recommendation task panicked")?;

        outcome.elapsed = start_time.elapsed();
        Ok(outcome)
    }

    /// Read the statistics file. Anything other than a usable snapshot
    /// degrades to `None`, which sends the policy to its fallback.
    pub fn load_statistics(&self) -> Option<StatisticsStore> {
        match StatisticsStore::load_optional(&self.config.stats_path) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    "Ignoring unreadable statistics at {:?}: {}",
                    self.config.stats_path, e
                );
                None
            }
        }
    }

    fn decide(&self, context: &Context, store: Option<&StatisticsStore>) -> RecommendationOutcome {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let recommendation = self.policy.decide(context, store, &self.catalog, &mut rng);
        to_outcome(&recommendation)
    }
}

fn to_outcome(recommendation: &Recommendation<'_>) -> RecommendationOutcome {
    let recommendations = recommendation
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let score = match item.source {
                RecommendationSource::Exploit { confidence } => Some(confidence),
                _ => None,
            };
            MovieRecommendation {
                movie: item.movie.clone(),
                rank: i + 1,
                source: item.source,
                score,
                explanation: explain(item.source),
            }
        })
        .collect();

    RecommendationOutcome {
        recommendations,
        path: recommendation.path,
        epsilon: recommendation.epsilon,
        candidate_count: recommendation.candidate_count,
        supplemented: recommendation.supplemented,
        elapsed: Duration::ZERO,
    }
}

fn explain(source: RecommendationSource) -> String {
    use pipeline::{FallbackTier, SupplementTier};

    match source {
        RecommendationSource::StrictSubIntent => "Matches your activity".to_string(),
        RecommendationSource::Fallback(FallbackTier::SubIntent) => {
            "Matches your activity (no history yet)".to_string()
        }
        RecommendationSource::Fallback(FallbackTier::Intent) => {
            "Fits what you want to do (no history yet)".to_string()
        }
        RecommendationSource::Fallback(FallbackTier::AnyMovie) => "From the catalog".to_string(),
        RecommendationSource::Explore => "Something new for this situation".to_string(),
        RecommendationSource::Exploit { confidence } => {
            format!("Popular in this situation (confidence {:.2})", confidence)
        }
        RecommendationSource::Supplement(SupplementTier::MoodAndIntent) => {
            "Fits your mood and intent".to_string()
        }
        RecommendationSource::Supplement(SupplementTier::Intent) => {
            "Fits what you want to do".to_string()
        }
        RecommendationSource::Supplement(SupplementTier::AnyMovie) => "From the catalog".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{StatBucket, StatEntry};
    use pipeline::ExplorationSchedule;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn build_test_catalog() -> Arc<CatalogIndex> {
        Arc::new(CatalogIndex::from_movies(vec![
            Movie::new("A", "Entertainment", "Positive"),
            Movie::new("B", "Entertainment", "Positive"),
            Movie::new("C", "Entertainment", "Negative"),
            Movie::new("D", "Relaxation", "Positive"),
            Movie::new("Rocky", "Focus", "Positive").with_sub_intent("Workout"),
        ]))
    }

    fn write_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn exploit_only() -> ExplorationSchedule {
        ExplorationSchedule {
            initial: 0.0,
            floor: 0.0,
            decay: 0.1,
        }
    }

    #[tokio::test]
    async fn test_missing_statistics_uses_fallback() {
        let config = RecommenderConfig::default()
            .with_stats_path("/nonexistent/bandit_stats.json")
            .with_seed(Some(1));
        let service = RecommendationService::from_catalog(build_test_catalog(), config);

        let context = Context::new("Positive", "Entertainment", "Sunny", "Evening");
        let outcome = service.recommend(context).await.unwrap();

        assert_eq!(outcome.path, DecisionPath::NoStatistics);
        assert_eq!(outcome.recommendations.len(), 3);
        assert!(outcome.recommendations.iter().all(|rec| rec.movie.intent == "Entertainment"));
        assert_eq!(outcome.recommendations[0].rank, 1);
    }

    #[tokio::test]
    async fn test_statistics_are_read_per_request() {
        let stats = write_json(
            r#"{"Positive|Entertainment||Sunny|Evening": {"A": {"reward": 10, "count": 5}, "B": {"reward": 2, "count": 1}}}"#,
        );
        let config = RecommenderConfig::default()
            .with_stats_path(stats.path())
            .with_target_count(2)
            .with_exploration(exploit_only())
            .with_seed(Some(3));
        let service = RecommendationService::from_catalog(build_test_catalog(), config);
        let context = Context::new("Positive", "Entertainment", "Sunny", "Evening");

        let outcome = service.recommend(context.clone()).await.unwrap();
        assert_eq!(outcome.path, DecisionPath::Exploit);
        assert_eq!(outcome.titles(), vec!["A", "B"]);
        assert!(outcome.recommendations[0].score.unwrap() > outcome.recommendations[1].score.unwrap());

        std::fs::write(
            stats.path(),
            r#"{"Positive|Entertainment||Sunny|Evening": {"B": {"reward": 50, "count": 5}, "A": {"reward": 1, "count": 5}}}"#,
        )
        .unwrap();
        let outcome = service.recommend(context).await.unwrap();
        assert_eq!(outcome.titles(), vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_corrupt_statistics_degrade_to_fallback() {
        let stats = write_json("{ not json");
        let config = RecommenderConfig::default().with_stats_path(stats.path());
        let service = RecommendationService::from_catalog(build_test_catalog(), config);

        let context = Context::new("Positive", "Relaxation", "Sunny", "Evening");
        let outcome = service.recommend(context).await.unwrap();
        assert_eq!(outcome.path, DecisionPath::NoStatistics);
        assert_eq!(outcome.titles(), vec!["D"]);
    }

    #[tokio::test]
    async fn test_caller_snapshot() {
        let context = Context::new("Positive", "Entertainment", "Sunny", "Evening");
        let mut store = StatisticsStore::new();
        store.insert(
            context.key(),
            [("C", StatEntry::new(4.0, 4))].into_iter().collect::<StatBucket>(),
        );
        let config = RecommenderConfig::default()
            .with_exploration(exploit_only())
            .with_target_count(3);
        let service = RecommendationService::from_catalog(build_test_catalog(), config);

        let outcome = service
            .recommend_with_snapshot(context, Some(Arc::new(store)))
            .await
            .unwrap();
        assert_eq!(outcome.titles()[0], "C");
        assert_eq!(outcome.recommendations.len(), 3);
        assert_eq!(outcome.supplemented, 2);
        assert_eq!(outcome.epsilon, Some(0.0));
    }

    #[tokio::test]
    async fn test_sub_intent_without_matches_is_empty() {
        let service = RecommendationService::from_catalog(build_test_catalog(), RecommenderConfig::default());
        let context = Context::new("Positive", "Entertainment", "Sunny", "Evening").with_sub_intent("Cooking");

        let outcome = service.recommend_with_snapshot(context, None).await.unwrap();
        assert_eq!(outcome.path, DecisionPath::StrictSubIntent);
        assert!(outcome.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_service() {
        let config = RecommenderConfig::default().with_stats_path("/nonexistent/stats.json");
        let service = RecommendationService::from_catalog(build_test_catalog(), config);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    let context = Context::new("Positive", "Focus", "Rainy", "Night");
                    service.recommend(context).await
                })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome.titles(), vec!["Rocky"]);
        }
    }

    #[tokio::test]
    async fn test_similarity_threshold_from_config() {
        let context = Context::new("Positive", "Entertainment", "Sunny", "Evening");
        let mut store = StatisticsStore::new();
        // mood + intent = 0.70
        store.insert(
            "Positive|Entertainment||Rainy|Night",
            [("C", StatEntry::new(1.0, 1))].into_iter().collect::<StatBucket>(),
        );
        let snapshot = Some(Arc::new(store));

        let lenient = RecommendationService::from_catalog(build_test_catalog(), RecommenderConfig::default());
        let outcome = lenient
            .recommend_with_snapshot(context.clone(), snapshot.clone())
            .await
            .unwrap();
        assert_eq!(outcome.candidate_count, 1);

        let mut config = RecommenderConfig::default();
        config.similarity_threshold = 70;
        let strict = RecommendationService::from_catalog(build_test_catalog(), config);
        let outcome = strict.recommend_with_snapshot(context, snapshot).await.unwrap();
        assert_eq!(outcome.path, DecisionPath::NoCandidates);
        assert_eq!(outcome.candidate_count, 0);
    }

    #[tokio::test]
    async fn test_new_rejects_empty_catalog() {
        let catalog = write_json("[]");
        let config = RecommenderConfig::default().with_catalog_path(catalog.path());
        assert!(RecommendationService::new(config).await.is_err());
    }
}
