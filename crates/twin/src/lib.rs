//! Twin: a fixed-arena buddy allocator with a second-chance object cache.
//!
//! This is the top-level facade crate. It re-exports the public API from
//! the twin sub-crates so users need only one dependency.
//!
//! # Quick start
//!
//! ```rust
//! use twin::prelude::*;
//!
//! struct Row { id: u32, text: String }
//!
//! impl KeyProvider<u32> for Row {
//!     fn matches_key(&self, key: &u32) -> bool { self.id == *key }
//! }
//!
//! impl FromKey<u32> for Row {
//!     fn from_key(key: &u32) -> Self { Row { id: *key, text: format!("row {key}") } }
//! }
//!
//! let config = CacheConfig::new(2).with_pool(PoolConfig::new(5, 12));
//! let mut cache: SecondChanceCache<u32, Row> = SecondChanceCache::new(config).unwrap();
//! cache.get(&1).unwrap();
//! cache.get(&2).unwrap();
//! cache.get(&1).unwrap(); // marks row 1 used
//! assert_eq!(cache.get(&3).unwrap().text, "row 3");
//! assert!(cache.contains(&1));
//! assert!(!cache.contains(&2));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `twin-core` | Offsets, powers, errors, key traits |
//! | [`pool`] | `twin-pool` | Buddy ledger, arena, typed allocator |
//! | [`cache`] | `twin-cache` | Second-chance cache |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core ids, errors and traits (`twin-core`).
pub use twin_core as types;

/// Buddy allocation over a fixed arena (`twin-pool`).
///
/// [`pool::BuddyPool`] hands out raw blocks; [`pool::TypedAllocator`]
/// places typed values in them.
pub use twin_pool as pool;

/// The bounded second-chance cache (`twin-cache`).
pub use twin_cache as cache;

/// Common imports for typical twin usage.
///
/// ```rust
/// use twin::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use twin_core::{BlockOffset, FromKey, KeyProvider, Power};

    // Errors
    pub use twin_core::{CacheError, ConfigError, PoolError};

    // Allocation
    pub use twin_pool::{BuddyPool, PoolConfig, Slot, TypedAllocator};

    // Cache
    pub use twin_cache::{CacheConfig, CacheStats, SecondChanceCache};
}
