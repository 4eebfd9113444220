use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{CatalogIndex, Context, StatisticsStore};
use pipeline::{DecisionPath, ExplorationSchedule};
use rand::seq::IndexedRandom;
use server::{RecommendationOutcome, RecommendationService, RecommenderConfig};
use sources::SimilaritySearch;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

/// mood-recs - contextual movie recommendations
#[derive(Parser)]
#[command(name = "mood-recs")]
#[command(about = "Movie recommendations from mood, intent, weather and time of day", long_about = None)]
struct Cli {
    /// Path to the movie catalog (JSON array) [default: data/movies.json]
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Path to the per-context reward statistics [default: data/bandit_stats.json]
    #[arg(long, global = true)]
    stats: Option<PathBuf>,

    /// Optional JSON config file; --catalog and --stats still apply on top
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// The situation to recommend for, from flags or a JSON file
#[derive(Args, Debug)]
struct ContextArgs {
    /// Mood label (e.g. Positive, Negative, Neutral)
    #[arg(long, required_unless_present = "context_file")]
    mood: Option<String>,

    /// What the user wants to do (e.g. Entertainment, Relaxation)
    #[arg(long, required_unless_present = "context_file")]
    intent: Option<String>,

    /// Specific activity; restricts results to movies tagged with it
    #[arg(long)]
    sub_intent: Option<String>,

    #[arg(long, default_value = "Sunny")]
    weather: String,

    #[arg(long, default_value = "Evening")]
    time_of_day: String,

    /// Read the whole context from a JSON file instead
    #[arg(long, conflicts_with_all = ["mood", "intent", "sub_intent"])]
    context_file: Option<PathBuf>,
}

impl ContextArgs {
    fn resolve(self) -> Result<Context> {
        if let Some(path) = self.context_file {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read context file {:?}", path))?;
            return serde_json::from_str(&contents)
                .with_context(|| format!("Invalid context file {:?}", path));
        }

        let context = Context::new(
            self.mood.unwrap_or_default(),
            self.intent.unwrap_or_default(),
            self.weather,
            self.time_of_day,
        );
        Ok(match self.sub_intent {
            Some(sub_intent) => context.with_sub_intent(sub_intent),
            None => context,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a context
    Recommend {
        #[command(flatten)]
        context: ContextArgs,

        /// Number of recommendations to return [default: 10]
        #[arg(long)]
        limit: Option<usize>,

        /// Seed the RNG for a reproducible result
        #[arg(long)]
        seed: Option<u64>,

        /// Show why each movie was picked
        #[arg(long)]
        explain: bool,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// List catalog movies, optionally filtered by attributes
    Movies {
        #[arg(long)]
        intent: Option<String>,

        #[arg(long)]
        mood: Option<String>,

        #[arg(long)]
        sub_intent: Option<String>,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show stored contexts similar to a context
    Contexts {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show the statistics, exploration rate and exploit ranking for a context
    Inspect {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = cli.resolve_config()?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            context,
            limit,
            seed,
            explain,
        } => {
            let config = recommend_config(config, limit, seed);
            handle_recommend(config, context.resolve()?, explain).await?
        }
        Commands::Search { title } => handle_search(&load_catalog(&config.catalog_path)?, &title),
        Commands::Movies {
            intent,
            mood,
            sub_intent,
            limit,
        } => handle_movies(
            &load_catalog(&config.catalog_path)?,
            intent.as_deref(),
            mood.as_deref(),
            sub_intent.as_deref(),
            limit,
        ),
        Commands::Contexts { context } => handle_contexts(
            &load_statistics(&config.stats_path)?,
            &SimilaritySearch::new().with_threshold(config.similarity_threshold),
            &context.resolve()?,
        ),
        Commands::Inspect { context } => handle_inspect(
            &load_statistics(&config.stats_path)?,
            &config.exploration,
            &context.resolve()?,
        ),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(config, requests, concurrent).await?,
    }

    Ok(())
}

impl Cli {
    /// Config file (or defaults) with any path flags applied on top
    fn resolve_config(&self) -> Result<RecommenderConfig> {
        let mut config = match &self.config {
            Some(path) => RecommenderConfig::from_file(path)?,
            None => RecommenderConfig::default(),
        };
        if let Some(catalog) = &self.catalog {
            config = config.with_catalog_path(catalog);
        }
        if let Some(stats) = &self.stats {
            config = config.with_stats_path(stats);
        }
        Ok(config)
    }
}

/// Apply the `recommend` flags; unset flags keep the configured values
fn recommend_config(
    mut config: RecommenderConfig,
    limit: Option<usize>,
    seed: Option<u64>,
) -> RecommenderConfig {
    if let Some(limit) = limit {
        config = config.with_target_count(limit);
    }
    if seed.is_some() {
        config = config.with_seed(seed);
    }
    config
}

fn load_catalog(path: &Path) -> Result<CatalogIndex> {
    let start = Instant::now();
    let catalog = CatalogIndex::load_from_file(path)
        .with_context(|| format!("Failed to load catalog from {:?}", path))?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );
    Ok(catalog)
}

fn load_statistics(path: &Path) -> Result<StatisticsStore> {
    StatisticsStore::load_from_file(path)
        .with_context(|| format!("Failed to load statistics from {:?}", path))
}

/// Handle the 'recommend' command
async fn handle_recommend(config: RecommenderConfig, context: Context, explain: bool) -> Result<()> {
    let service = RecommendationService::new(config).await?;
    println!("Context: {}", context.key().as_str().cyan());

    let outcome = service.recommend(context).await?;
    print_recommendations(&outcome, explain);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &CatalogIndex, title: &str) {
    let matches = catalog.search(title);
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches.iter().take(20) {
        println!(
            "  {} [{} / {}{}]",
            movie.title,
            movie.intent,
            movie.mood_tag,
            movie
                .sub_intent()
                .map(|s| format!(" / {}", s))
                .unwrap_or_default()
        );
    }
}

/// Handle the 'movies' command
fn handle_movies(
    catalog: &CatalogIndex,
    intent: Option<&str>,
    mood: Option<&str>,
    sub_intent: Option<&str>,
    limit: usize,
) {
    let matching = catalog.filter(|movie| {
        intent.is_none_or(|intent| movie.intent == intent)
            && mood.is_none_or(|mood| movie.mood_tag == mood)
            && sub_intent.is_none_or(|sub_intent| movie.sub_intent() == Some(sub_intent))
    });

    println!(
        "{}",
        format!("{} of {} movies match:", matching.len(), catalog.len())
            .bold()
            .blue()
    );
    for movie in matching.iter().take(limit) {
        println!("  {} [{} / {}]", movie.title, movie.intent, movie.mood_tag);
    }
}

/// Handle the 'contexts' command
fn handle_contexts(store: &StatisticsStore, search: &SimilaritySearch, context: &Context) {
    let key = context.key();
    let mut similar = search.similar_contexts_scored(&key, store);
    similar.sort_by(|a, b| b.score.total_cmp(&a.score));

    println!("{}", format!("Contexts similar to {}:", key).bold().blue());
    if similar.is_empty() {
        println!("  (none above the similarity threshold)");
    }
    for entry in similar {
        let titles = store.bucket(entry.key).map_or(0, |bucket| bucket.len());
        println!(
            "  {:.2}  {}  ({} titles)",
            entry.score,
            entry.key.as_str().cyan(),
            titles
        );
    }
}

/// Handle the 'inspect' command
fn handle_inspect(store: &StatisticsStore, schedule: &ExplorationSchedule, context: &Context) {
    let key = context.key();
    println!("{}", format!("Statistics for {}:", key).bold().blue());

    let Some(bucket) = store.bucket(&key).filter(|bucket| !bucket.is_empty()) else {
        println!("  No statistics for this exact context; similar contexts would be used.");
        println!("  Epsilon: {:.3}", schedule.epsilon(None));
        return;
    };

    println!("  Titles: {}", bucket.len());
    println!("  Total views: {}", bucket.total_views());
    println!("  Epsilon: {:.3}", schedule.epsilon(Some(bucket)));

    let mut ranking: Vec<_> = bucket.iter().collect();
    ranking.sort_by(|a, b| b.1.confidence().total_cmp(&a.1.confidence()));

    println!("{}", "Exploit ranking:".bold());
    for (rank, (title, entry)) in ranking.iter().enumerate().take(10) {
        println!(
            "  {}. {} - confidence {:.3} (reward {:.1}, count {})",
            (rank + 1).to_string().green(),
            title,
            entry.confidence(),
            entry.reward,
            entry.count
        );
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(config: RecommenderConfig, requests: usize, concurrent: usize) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must both be at least 1");
    }
    let service = RecommendationService::new(config).await?;

    const MOODS: [&str; 3] = ["Positive", "Negative", "Neutral"];
    const INTENTS: [&str; 4] = ["Entertainment", "Relaxation", "Focus", "Inspiration"];
    const WEATHER: [&str; 4] = ["Sunny", "Rainy", "Cloudy", "Snowy"];
    const TIMES: [&str; 4] = ["Morning", "Afternoon", "Evening", "Night"];

    // Generate a set of random contexts
    let mut rng = rand::rng();
    let contexts: Vec<Context> = (0..requests)
        .map(|_| {
            Context::new(
                *MOODS.choose(&mut rng).unwrap_or(&"Neutral"),
                *INTENTS.choose(&mut rng).unwrap_or(&"Entertainment"),
                *WEATHER.choose(&mut rng).unwrap_or(&"Sunny"),
                *TIMES.choose(&mut rng).unwrap_or(&"Evening"),
            )
        })
        .collect();

    // Use tokio::spawn to make concurrent requests, at most `concurrent` in flight
    let permits = Arc::new(Semaphore::new(concurrent));
    let wall_clock = Instant::now();
    let mut handles = vec![];
    for context in contexts {
        let service = service.clone();
        let permits = permits.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            let outcome = service.recommend(context).await?;
            debug!("{:?} -> {} movies", outcome.path, outcome.recommendations.len());
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = wall_clock.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("Benchmark results:");
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(outcome: &RecommendationOutcome, explain: bool) {
    println!("{}", "Movie Recommendations:".bold().blue());
    if outcome.recommendations.is_empty() {
        println!("  No movies match this request.");
    }

    for rec in &outcome.recommendations {
        match rec.score {
            Some(score) => println!(
                "{}. {} [{}] - Confidence: {:.2}",
                rec.rank.to_string().green(),
                rec.movie.title,
                rec.movie.intent,
                score
            ),
            None => println!(
                "{}. {} [{}]",
                rec.rank.to_string().green(),
                rec.movie.title,
                rec.movie.intent
            ),
        }
        if explain {
            println!("   Explanation: {}", rec.explanation);
        }
    }

    if explain {
        let path = match outcome.path {
            DecisionPath::StrictSubIntent => "sub-intent filter",
            DecisionPath::NoStatistics => "fallback (no statistics)",
            DecisionPath::NoCandidates => "fallback (no candidates)",
            DecisionPath::Explore => "exploration",
            DecisionPath::Exploit => "exploitation",
        };
        println!();
        println!("Decision: {}", path.bold());
        if let Some(epsilon) = outcome.epsilon {
            println!(
                "Epsilon: {:.3} over {} candidates, {} supplemented",
                epsilon, outcome.candidate_count, outcome.supplemented
            );
        }
        println!("Took {:?}", outcome.elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_file_paths_are_used_without_flags() {
        let file = write_config(
            r#"{"catalog_path": "/srv/recs/movies.json", "stats_path": "/srv/recs/stats.json"}"#,
        );
        let cli = Cli::try_parse_from([
            "mood-recs",
            "--config",
            file.path().to_str().unwrap(),
            "search",
            "--title",
            "heat",
        ])
        .unwrap();

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("/srv/recs/movies.json"));
        assert_eq!(config.stats_path, PathBuf::from("/srv/recs/stats.json"));
    }

    #[test]
    fn test_path_flags_override_config_file() {
        let file = write_config(r#"{"catalog_path": "/srv/recs/movies.json"}"#);
        let cli = Cli::try_parse_from([
            "mood-recs",
            "--config",
            file.path().to_str().unwrap(),
            "--stats",
            "/tmp/stats.json",
            "search",
            "--title",
            "heat",
        ])
        .unwrap();

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("/srv/recs/movies.json"));
        assert_eq!(config.stats_path, PathBuf::from("/tmp/stats.json"));
    }

    #[test]
    fn test_defaults_without_config_or_flags() {
        let cli = Cli::try_parse_from(["mood-recs", "search", "--title", "heat"]).unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config, RecommenderConfig::default());
    }

    #[test]
    fn test_recommend_flags_keep_configured_limit_and_seed() {
        let configured = RecommenderConfig::default()
            .with_target_count(5)
            .with_seed(Some(9));

        let unchanged = recommend_config(configured.clone(), None, None);
        assert_eq!(unchanged.target_count, 5);
        assert_eq!(unchanged.seed, Some(9));

        let overridden = recommend_config(configured, Some(3), Some(1));
        assert_eq!(overridden.target_count, 3);
        assert_eq!(overridden.seed, Some(1));
    }

    #[test]
    fn test_recommend_limit_is_optional() {
        let cli = Cli::try_parse_from([
            "mood-recs",
            "recommend",
            "--mood",
            "Positive",
            "--intent",
            "Entertainment",
        ])
        .unwrap();
        match cli.command {
            Commands::Recommend { limit, seed, .. } => {
                assert_eq!(limit, None);
                assert_eq!(seed, None);
            }
            _ => panic!("expected the recommend command"),
        }
    }
}
