use data_loader::load_from_files;
use std::path::Path;
use std::time::Instant;

fn main() {
    let catalog_path = Path::new("data/movies.json");
    let stats_path = Path::new("data/bandit_stats.json");

    println!("Loading catalog and statistics...\n");

    let start = Instant::now();
    let (catalog, stats) = load_from_files(catalog_path, stats_path)
        .expect("Failed to load data files");
    let elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", catalog.len());
    match stats {
        Some(store) => {
            let entries: usize = store.iter().map(|(_, bucket)| bucket.len()).sum();
            let malformed = store.keys().filter(|key| key.decode().is_err()).count();
            println!("Contexts: {} ({} malformed keys)", store.len(), malformed);
            println!("Stat entries: {}", entries);
        }
        None => println!("Statistics: none (fallback mode)"),
    }
}
