//! Random selection helpers. The RNG is always passed in so decisions are
//! reproducible under a seeded generator.

use rand::Rng;
use rand::seq::{SliceRandom, index};

/// Uniform sample of `min(amount, items.len())` distinct elements
pub fn sample<T: Copy, R: Rng + ?Sized>(items: &[T], amount: usize, rng: &mut R) -> Vec<T> {
    let amount = amount.min(items.len());
    index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i])
        .collect()
}

/// Shuffle in place
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
