//! Test utilities and fixtures for twin development.
//!
//! Provides a drop-tracked [`Page`] object for cache tests, a seeded
//! [`Workload`] generator for allocator churn, and [`assert_partition`]
//! for checking ledger invariants from outside the pool crate.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod workload;

pub use fixtures::{drop_log, reset_drop_log, Page, PAGE_PAYLOAD};
pub use workload::{Op, Workload};

use twin_pool::BlockLedger;

/// Panic unless `ledger` tiles its arena exactly and passes its own audit.
pub fn assert_partition(ledger: &BlockLedger) {
    if let Err(reason) = ledger.audit() {
        panic!("ledger audit failed: {reason}");
    }
    let mut cursor = 0usize;
    for block in ledger.blocks() {
        assert_eq!(
            block.offset().0,
            cursor,
            "gap or overlap before {block}"
        );
        cursor = block.end();
    }
    assert_eq!(cursor, ledger.capacity(), "blocks stop short of the arena end");
    assert_eq!(
        ledger.used_bytes() + ledger.free_bytes(),
        ledger.capacity()
    );
}
