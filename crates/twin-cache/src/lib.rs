//! Bounded second-chance object cache for twin.
//!
//! [`SecondChanceCache`] keeps at most `capacity` objects, each created
//! from its key on first lookup and stored in a buddy arena through a
//! [`TypedAllocator`](twin_pool::TypedAllocator). Replacement follows the
//! second-chance (CLOCK) policy: a hit sets an entry's used bit, and the
//! eviction scan spares a used entry once before it becomes a victim.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod stats;

pub use cache::SecondChanceCache;
pub use config::CacheConfig;
pub use stats::CacheStats;
