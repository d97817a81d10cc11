//! Benchmark workloads and utilities for the rawbuf containers.
//!
//! Provides deterministic, seeded inputs shared by the benchmarks and
//! examples:
//!
//! - [`seeded_values`]: reproducible element data
//! - [`seeded_indices`]: reproducible access patterns
//! - [`shape_walk`]: reproducible resize sequences for the grid benches

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reference 1D extent: 64K elements.
pub const REFERENCE_LEN: usize = 64 * 1024;

/// Reference 2D extent: 256 x 256 cells.
pub const REFERENCE_SIDE: usize = 256;

/// Deterministic element data: `len` values from a ChaCha8 stream.
pub fn seeded_values(seed: u64, len: usize) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.random()).collect()
}

/// Deterministic access pattern: `len` indices, each below `bound`.
pub fn seeded_indices(seed: u64, len: usize, bound: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(0..bound)).collect()
}

/// Deterministic resize sequence: `steps` dimension pairs in
/// `1..=max_dim`.
pub fn shape_walk(seed: u64, steps: usize, max_dim: usize) -> Vec<(usize, usize)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..steps)
        .map(|_| {
            (
                rng.random_range(1..=max_dim),
                rng.random_range(1..=max_dim),
            )
        })
        .collect()
}
