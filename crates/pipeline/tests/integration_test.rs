//! End-to-end tests of the selection policy against small in-memory
//! catalogs and statistics snapshots.

use data_loader::{CatalogIndex, Context, Movie, StatBucket, StatEntry, StatisticsStore};
use pipeline::{
    DecisionPath, ExplorationSchedule, FallbackTier, RecommendationSource, SelectionPolicy,
    recommend,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

fn create_catalog() -> CatalogIndex {
    let mut movies = vec![
        Movie::new("Rocky", "Focus", "Positive").with_sub_intent("Workout"),
        Movie::new("Creed", "Focus", "Positive").with_sub_intent("Workout"),
        Movie::new("Julie & Julia", "Relaxation", "Positive").with_sub_intent("Cooking"),
    ];
    for i in 0..12 {
        movies.push(Movie::new(format!("Comedy {i}"), "Entertainment", "Positive"));
    }
    for i in 0..6 {
        movies.push(Movie::new(format!("Thriller {i}"), "Entertainment", "Negative"));
    }
    for i in 0..6 {
        movies.push(Movie::new(format!("Documentary {i}"), "Focus", "Neutral"));
    }
    CatalogIndex::from_movies(movies)
}

fn evening_context() -> Context {
    Context::new("Positive", "Entertainment", "Sunny", "Evening")
}

fn exploit_only() -> SelectionPolicy {
    SelectionPolicy::new().with_schedule(ExplorationSchedule {
        initial: 0.0,
        floor: 0.0,
        decay: 0.1,
    })
}

fn assert_unique(titles: &[&str]) {
    let unique: HashSet<&&str> = titles.iter().collect();
    assert_eq!(unique.len(), titles.len(), "duplicate titles in {titles:?}");
}

#[test]
fn test_strict_sub_intent_returns_only_tagged_movies() {
    let catalog = create_catalog();
    let context = evening_context().with_sub_intent("Workout");

    for seed in 0..10 {
        let result = SelectionPolicy::new().decide(&context, None, &catalog, &mut StdRng::seed_from_u64(seed));
        assert_eq!(result.path, DecisionPath::StrictSubIntent);
        let mut titles = result.titles();
        titles.sort();
        assert_eq!(titles, vec!["Creed", "Rocky"]);
    }
}

#[test]
fn test_strict_sub_intent_without_matches_is_empty() {
    // Statistics for the context exist, but the sub-intent bypasses them
    let catalog = CatalogIndex::from_movies(vec![
        Movie::new("Paddington", "Entertainment", "Positive"),
        Movie::new("Up", "Relaxation", "Positive"),
    ]);
    let context = evening_context().with_sub_intent("Workout");
    let mut store = StatisticsStore::new();
    store.insert(
        context.key(),
        [("Paddington", StatEntry::new(9.0, 3))].into_iter().collect::<StatBucket>(),
    );

    let result = SelectionPolicy::new().decide(&context, Some(&store), &catalog, &mut StdRng::seed_from_u64(1));
    assert_eq!(result.path, DecisionPath::StrictSubIntent);
    assert!(result.is_empty());
}

#[test]
fn test_strict_sub_intent_is_capped_at_target() {
    let movies: Vec<Movie> = (0..25)
        .map(|i| Movie::new(format!("Workout {i}"), "Focus", "Positive").with_sub_intent("Workout"))
        .collect();
    let catalog = CatalogIndex::from_movies(movies);
    let context = evening_context().with_sub_intent("Workout");

    let result = SelectionPolicy::new().decide(&context, None, &catalog, &mut StdRng::seed_from_u64(4));
    assert_eq!(result.len(), 10);
    assert_unique(&result.titles());
}

#[test]
fn test_missing_statistics_falls_back_to_intent() {
    let catalog = CatalogIndex::from_movies(vec![
        Movie::new("Heat", "Entertainment", "Negative"),
        Movie::new("Jaws", "Entertainment", "Negative"),
        Movie::new("Paddington", "Entertainment", "Positive"),
        Movie::new("Up", "Relaxation", "Positive"),
        Movie::new("Dune", "Focus", "Neutral"),
    ]);
    let context = evening_context();

    let result = SelectionPolicy::new().decide(&context, None, &catalog, &mut StdRng::seed_from_u64(6));

    assert_eq!(result.path, DecisionPath::NoStatistics);
    assert_eq!(result.len(), 3);
    assert!(result
        .items
        .iter()
        .all(|item| item.movie.intent == "Entertainment"
            && item.source == RecommendationSource::Fallback(FallbackTier::Intent)));
    // Fallback results are not padded
    assert_eq!(result.supplemented, 0);
}

#[test]
fn test_empty_statistics_falls_back_to_intent() {
    let catalog = CatalogIndex::from_movies(vec![
        Movie::new("Heat", "Entertainment", "Negative"),
        Movie::new("Jaws", "Entertainment", "Negative"),
        Movie::new("Paddington", "Entertainment", "Positive"),
        Movie::new("Up", "Relaxation", "Positive"),
        Movie::new("Dune", "Focus", "Neutral"),
    ]);
    let store = StatisticsStore::new();

    let result = SelectionPolicy::new().decide(&evening_context(), Some(&store), &catalog, &mut StdRng::seed_from_u64(6));

    assert_eq!(result.path, DecisionPath::NoCandidates);
    let mut titles = result.titles();
    titles.sort();
    assert_eq!(titles, vec!["Heat", "Jaws", "Paddington"]);
    assert!(result
        .items
        .iter()
        .all(|item| item.source == RecommendationSource::Fallback(FallbackTier::Intent)));
    assert_eq!(result.supplemented, 0);
}

#[test]
fn test_no_candidates_uses_fallback() {
    let catalog = create_catalog();
    let context = evening_context();
    let mut store = StatisticsStore::new();
    // Only weather matches: 0.1, not similar
    store.insert(
        "Negative|Focus||Sunny|Morning",
        [("Documentary 0", StatEntry::new(5.0, 5))].into_iter().collect::<StatBucket>(),
    );

    let result = SelectionPolicy::new().decide(&context, Some(&store), &catalog, &mut StdRng::seed_from_u64(0));
    assert_eq!(result.path, DecisionPath::NoCandidates);
    assert_eq!(result.len(), 10);
    assert!(result.items.iter().all(|item| item.movie.intent == "Entertainment"));
}

#[test]
fn test_exploit_orders_by_confidence() {
    let catalog = CatalogIndex::from_movies(vec![
        Movie::new("A", "Entertainment", "Positive"),
        Movie::new("B", "Entertainment", "Positive"),
    ]);
    let context = evening_context();
    let mut store = StatisticsStore::new();
    store.insert(
        context.key(),
        [("A", StatEntry::new(10.0, 5)), ("B", StatEntry::new(2.0, 1))]
            .into_iter()
            .collect::<StatBucket>(),
    );

    let result = exploit_only().decide(&context, Some(&store), &catalog, &mut StdRng::seed_from_u64(0));
    assert_eq!(result.path, DecisionPath::Exploit);
    assert_eq!(result.titles(), vec!["A", "B"]);

    let confidences: Vec<f64> = result
        .items
        .iter()
        .filter_map(|item| match item.source {
            RecommendationSource::Exploit { confidence } => Some(confidence),
            _ => None,
        })
        .collect();
    assert!((confidences[0] - 10.0 / 6.0).abs() < 1e-9);
    assert!((confidences[1] - 1.0).abs() < 1e-9);
}

#[test]
fn test_exploit_keeps_best_ten_and_pads_nothing() {
    let catalog = create_catalog();
    let context = evening_context();
    let bucket: StatBucket = (0..12)
        .map(|i| (format!("Comedy {i}"), StatEntry::new(i as f64, 4)))
        .collect();
    let mut store = StatisticsStore::new();
    store.insert(context.key(), bucket);

    let result = exploit_only().decide(&context, Some(&store), &catalog, &mut StdRng::seed_from_u64(0));
    let expected: Vec<String> = (2..12).rev().map(|i| format!("Comedy {i}")).collect();
    assert_eq!(result.titles(), expected);
    assert_eq!(result.supplemented, 0);
}

#[test]
fn test_similar_contexts_feed_exploration_and_padding() {
    let catalog = create_catalog();
    let context = evening_context();
    let mut store = StatisticsStore::new();
    // mood + intent + weather = 0.8
    store.insert(
        "Positive|Entertainment||Sunny|Morning",
        [("Comedy 0", StatEntry::new(3.0, 2)), ("Comedy 1", StatEntry::new(1.0, 2))]
            .into_iter()
            .collect::<StatBucket>(),
    );

    for seed in 0..20 {
        let result = SelectionPolicy::new().decide(&context, Some(&store), &catalog, &mut StdRng::seed_from_u64(seed));

        // An unseen exact context explores half the time
        assert_eq!(result.epsilon, Some(0.5));
        assert_eq!(result.candidate_count, 2);
        assert_eq!(result.len(), 10);
        assert_unique(&result.titles());

        match result.path {
            DecisionPath::Explore => {
                let mut head: Vec<&str> = result.titles()[..2].to_vec();
                head.sort();
                assert_eq!(head, vec!["Comedy 0", "Comedy 1"]);
                assert_eq!(result.supplemented, 8);
            }
            DecisionPath::Exploit => {
                // Only exact statistics are trusted, so everything is padding
                assert_eq!(result.supplemented, 10);
            }
            other => panic!("unexpected path {other:?}"),
        }
    }
}

#[test]
fn test_results_are_bounded_and_unique() {
    let catalog = create_catalog();
    let contexts = [
        evening_context(),
        Context::new("Negative", "Entertainment", "Rainy", "Night"),
        Context::new("Neutral", "Focus", "Cloudy", "Morning"),
        Context::new("Neutral", "", "Cloudy", "Morning"),
    ];
    let mut store = StatisticsStore::new();
    store.insert(
        contexts[1].key(),
        [("Thriller 0", StatEntry::new(4.0, 2)), ("Missing", StatEntry::new(8.0, 2))]
            .into_iter()
            .collect::<StatBucket>(),
    );

    for context in &contexts {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            for snapshot in [None, Some(&store)] {
                let movies = recommend(context, snapshot, &catalog, 10, &mut rng);
                let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
                assert!(titles.len() <= 10);
                assert_unique(&titles);
                assert!(titles.iter().all(|title| catalog.by_title(title).is_some()));
            }
        }
    }
}

#[test]
fn test_seeded_decisions_are_reproducible() {
    let catalog = create_catalog();
    let context = evening_context();

    let a = recommend(&context, None, &catalog, 10, &mut StdRng::seed_from_u64(99));
    let b = recommend(&context, None, &catalog, 10, &mut StdRng::seed_from_u64(99));
    assert_eq!(a, b);
}

#[test]
fn test_empty_catalog_gives_empty_result() {
    let catalog = CatalogIndex::new();
    let result = SelectionPolicy::new().decide(&evening_context(), None, &catalog, &mut StdRng::seed_from_u64(0));
    assert!(result.is_empty());
}
