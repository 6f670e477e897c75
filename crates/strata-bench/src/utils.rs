//! Benchmark data generators.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates `count` values uniformly drawn from `0..max`.
pub fn random_values(count: usize, max: i32) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count).map(|_| rng.gen_range(0..max)).collect()
}

/// Generates `0..count` in ascending order.
pub fn sequential_values(count: usize) -> Vec<i32> {
    (0..count as i32).collect()
}

/// Generates `count` rows of `width` random values.
pub fn random_rows(count: usize, width: usize, max: i32) -> Vec<Vec<i32>> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|_| (0..width).map(|_| rng.gen_range(0..max)).collect())
        .collect()
}
