//! End-to-end checks through the facade crate.

use twin::prelude::*;
use twin_test_utils::{assert_partition, drop_log, reset_drop_log, Op, Page, Workload};

#[test]
fn out_of_memory_boundary() {
    let config = PoolConfig::new(4, 10);
    let mut pool = BuddyPool::new(config.clone()).unwrap();
    let err = pool.allocate(config.arena_bytes() + 1).err().unwrap();
    assert!(matches!(err, PoolError::OutOfMemory { requested: 1025, .. }));
    let whole = pool.allocate(config.arena_bytes()).unwrap();
    assert_eq!(whole, BlockOffset::ZERO);
    assert!(pool.allocate(1).is_err());
    pool.deallocate(whole).unwrap();
    assert_partition(pool.ledger());
}

#[test]
fn seeded_churn_keeps_the_partition() {
    let ops = Workload::new(2024).churn(3_000, 700, 65);
    let mut pool = BuddyPool::new(PoolConfig::new(4, 16)).unwrap();
    let mut live = Vec::new();
    for op in ops {
        match op {
            Op::Alloc(size) => {
                if let Ok(off) = pool.allocate(size) {
                    live.push(off);
                }
            }
            Op::Free(i) if !live.is_empty() => {
                let off = live.swap_remove(i % live.len());
                pool.deallocate(off).unwrap();
            }
            Op::Free(_) => {}
        }
    }
    assert_partition(pool.ledger());
    for off in live {
        pool.deallocate(off).unwrap();
    }
    assert!(pool.ledger().is_quiescent());
}

#[test]
fn identical_requests_produce_identical_layouts() {
    let sizes = Workload::new(5).sizes(200, 300);
    let layout = |sizes: &[usize]| {
        let mut pool = BuddyPool::new(PoolConfig::new(4, 18)).unwrap();
        for &size in sizes {
            pool.allocate(size).unwrap();
        }
        pool.ledger()
            .blocks()
            .map(|b| (b.offset(), b.power(), b.is_used()))
            .collect::<Vec<_>>()
    };
    assert_eq!(layout(&sizes), layout(&sizes));
}

#[test]
fn cache_over_shared_allocator() {
    reset_drop_log();
    let mut alloc = TypedAllocator::new(PoolConfig::new(6, 12)).unwrap();
    let pinned = alloc.create(Page::new(1_000)).unwrap();
    let mut cache: SecondChanceCache<u64, Page> =
        SecondChanceCache::with_allocator(2, alloc).unwrap();
    for key in [1, 2, 1, 3] {
        cache.get(&key).unwrap();
    }
    assert_eq!(drop_log(), vec![2]);
    assert_eq!(cache.allocator().live_count(), 3);
    assert_eq!(cache.allocator().get(&pinned).id, 1_000);
    drop(cache);
    let mut log = drop_log();
    log.sort_unstable();
    assert_eq!(log, vec![1, 2, 3, 1_000]);
}

#[test]
fn config_errors_surface_through_the_cache() {
    let err = SecondChanceCache::<u64, Page>::new(
        CacheConfig::new(4).with_pool(PoolConfig::new(10, 4)),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        CacheError::Config(ConfigError::MinAboveMax { .. })
    ));
    assert!(std::error::Error::source(&err).is_some());
}

#[cfg(not(miri))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_churn_drains_to_one_free_block(
            seed in any::<u64>(),
            alloc_percent in 30u32..90,
        ) {
            let ops = Workload::new(seed).churn(400, 600, alloc_percent);
            let mut pool = BuddyPool::new(PoolConfig::new(3, 14)).unwrap();
            let mut live = Vec::new();
            for op in ops {
                match op {
                    Op::Alloc(size) => match pool.allocate(size) {
                        Ok(off) => {
                            let block = pool.ledger().block(off).unwrap();
                            prop_assert_eq!(block.power(), pool.ledger().target_power(size));
                            live.push(off);
                        }
                        Err(PoolError::OutOfMemory { largest_free, .. }) => {
                            prop_assert!(largest_free.is_none_or(|bytes| bytes < size));
                        }
                        Err(other) => prop_assert!(false, "unexpected error {other}"),
                    },
                    Op::Free(i) if !live.is_empty() => {
                        let off = live.swap_remove(i % live.len());
                        pool.deallocate(off).unwrap();
                        // The block may have merged away, so either rejection is fine.
                        prop_assert!(matches!(
                            pool.deallocate(off),
                            Err(PoolError::DoubleFree { .. } | PoolError::InvalidDeallocation { .. })
                        ), "second deallocate must be rejected");
                    }
                    Op::Free(_) => {}
                }
            }
            prop_assert_eq!(pool.ledger().audit(), Ok(()));
            for off in live {
                pool.deallocate(off).unwrap();
            }
            prop_assert!(pool.ledger().is_quiescent());
        }
    }
}
