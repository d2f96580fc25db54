//! Seeded allocation workloads.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of an allocator workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate a block of this many bytes.
    Alloc(usize),
    /// Free the live block at this index, taken modulo the live count.
    Free(usize),
}

/// Deterministic generator of allocation sizes, churn sequences and
/// cache key streams.
pub struct Workload {
    rng: ChaCha8Rng,
}

impl Workload {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// `count` request sizes in `1..=max_size`.
    pub fn sizes(&mut self, count: usize, max_size: usize) -> Vec<usize> {
        (0..count)
            .map(|_| self.rng.random_range(1..=max_size))
            .collect()
    }

    /// A mix of allocations and frees, roughly `alloc_percent`% allocations.
    pub fn churn(&mut self, count: usize, max_size: usize, alloc_percent: u32) -> Vec<Op> {
        (0..count)
            .map(|_| {
                if self.rng.random_range(0..100) < alloc_percent {
                    Op::Alloc(self.rng.random_range(1..=max_size))
                } else {
                    Op::Free(self.rng.random_range(0..usize::MAX))
                }
            })
            .collect()
    }

    /// `count` keys in `0..key_space`, with a hot set of `hot` keys drawn
    /// for about half of the lookups.
    pub fn keys(&mut self, count: usize, key_space: u64, hot: u64) -> Vec<u64> {
        let hot = hot.clamp(1, key_space);
        (0..count)
            .map(|_| {
                if self.rng.random_bool(0.5) {
                    self.rng.random_range(0..hot)
                } else {
                    self.rng.random_range(0..key_space)
                }
            })
            .collect()
    }
}
