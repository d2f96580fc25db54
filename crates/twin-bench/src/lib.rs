//! Benchmark profiles for the twin allocator and cache.
//!
//! - [`reference_pool`]: 1 MiB arena with 16-byte minimum blocks
//! - [`reference_cache`]: 64-entry cache over a 64 KiB arena
//! - [`stress_cache`]: 1024-entry cache over a 1 MiB arena

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use twin_cache::CacheConfig;
use twin_pool::PoolConfig;

/// The default pool: `2^20` bytes, smallest block `2^4`.
pub fn reference_pool() -> PoolConfig {
    PoolConfig::default()
}

/// A cache small enough that a skewed key stream keeps evicting.
pub fn reference_cache() -> CacheConfig {
    CacheConfig::new(64).with_pool(PoolConfig::new(6, 16))
}

/// A cache whose linear lookup scan dominates the cost of a miss.
pub fn stress_cache() -> CacheConfig {
    CacheConfig::new(1024).with_pool(PoolConfig::new(6, 20))
}
