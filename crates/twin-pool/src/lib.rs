//! Fixed-arena buddy allocation for the twin object cache.
//!
//! One arena of `2^max_power` bytes is reserved up front and never grows.
//! It is carved into power-of-two blocks by a binary buddy system: blocks
//! are split in half on allocation until they fit the request, and a freed
//! block is merged with its buddy, repeatedly, whenever both halves of a
//! larger block are free. This crate is the only one in the workspace that
//! may contain `unsafe` code.
//!
//! # Architecture
//!
//! ```text
//! TypedAllocator (values of any 'static type, owned through Slot<T>)
//! └── BuddyPool (byte-level allocate / deallocate)
//!     ├── BlockLedger (offset-keyed blocks + free list by size class)
//!     └── RawArena (the reservation; all raw pointer work lives here)
//! ```
//!
//! Blocks are addressed by [`BlockOffset`](twin_core::BlockOffset) from the
//! arena base. The buddy of a block of power `p` at offset `o` is the block
//! at `o ^ 2^p`, so no block stores a pointer to another.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
pub mod config;
pub mod handle;
pub mod ledger;
pub mod pool;
mod raw;
pub mod stats;
pub mod typed;

// Public re-exports for the primary API surface.
pub use block::Block;
pub use config::PoolConfig;
pub use handle::Slot;
pub use ledger::{BlockLedger, FreeHistogram};
pub use pool::BuddyPool;
pub use raw::ARENA_ALIGN;
pub use stats::PoolStats;
pub use typed::TypedAllocator;
