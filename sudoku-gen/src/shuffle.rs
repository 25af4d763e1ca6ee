//! Seeded randomness: the generator's RNG handle and the uniform
//! permutations used for box seeding and elimination ordering.

use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

/// ChaCha20 stream for one generation run. A given seed produces the
/// same stream on every platform, so whole pipelines replay exactly.
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Fills `base, base + 1, ..., base + len - 1` and shuffles it with the
/// Fisher-Yates reverse sweep (what `SliceRandom::shuffle` performs).
/// Uniform over all permutations and reproducible for a fixed seed.
pub fn permutation<R: Rng + ?Sized>(len: usize, base: u8, rng: &mut R) -> Vec<u8> {
    let mut values: Vec<u8> = (0..len).map(|i| base + i as u8).collect();
    values.shuffle(rng);
    values
}
