//! Core types and traits for the twin arena allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the twin workspace:
//! block identifiers, size classes, error types, and the capability
//! traits a type implements to live in the object cache.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{CacheError, ConfigError, PoolError};
pub use id::{ceil_log2, AllocatorId, BlockOffset, Power};
pub use traits::{FromKey, KeyProvider};
