//! Filter implementations for catalog selection.
//!
//! These are the building blocks of the strict sub-intent path, the
//! fallback tiers and the supplementation tiers.

pub mod intent;
pub mod mood;
pub mod sub_intent;
pub mod well_formed;

// Re-export for convenience
pub use intent::IntentFilter;
pub use mood::MoodFilter;
pub use sub_intent::SubIntentFilter;
pub use well_formed::WellFormedFilter;
