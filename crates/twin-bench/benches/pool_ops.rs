//! Criterion micro-benchmarks for buddy allocation and deallocation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use twin_bench::reference_pool;
use twin_pool::{BuddyPool, TypedAllocator};
use twin_test_utils::{Op, Workload};

/// Benchmark: allocate then free one minimum-size block on a fresh arena,
/// exercising the full split and merge chain.
fn bench_split_merge_chain(c: &mut Criterion) {
    let mut pool = BuddyPool::new(reference_pool()).unwrap();
    c.bench_function("pool_split_merge_chain", |b| {
        b.iter(|| {
            let off = pool.allocate(black_box(16)).unwrap();
            pool.deallocate(off).unwrap();
        });
    });
}

/// Benchmark: fill the arena with 1K mixed-size blocks, then free them all.
fn bench_fill_and_drain(c: &mut Criterion) {
    let sizes = Workload::new(42).sizes(1_000, 512);
    let mut pool = BuddyPool::new(reference_pool()).unwrap();
    c.bench_function("pool_fill_and_drain_1k", |b| {
        b.iter(|| {
            let offsets: Vec<_> = sizes
                .iter()
                .map(|&size| pool.allocate(size).unwrap())
                .collect();
            for off in offsets {
                pool.deallocate(off).unwrap();
            }
        });
    });
}

/// Benchmark: replay a seeded 70/30 allocate/free churn of 2K operations.
fn bench_churn(c: &mut Criterion) {
    let ops = Workload::new(7).churn(2_000, 1_024, 70);
    c.bench_function("pool_churn_2k", |b| {
        b.iter(|| {
            let mut pool = BuddyPool::new(reference_pool()).unwrap();
            let mut live = Vec::new();
            for op in &ops {
                match *op {
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
            black_box(pool.ledger().block_count());
        });
    });
}

/// Benchmark: typed create + destroy of a small heap-owning value.
fn bench_typed_create_destroy(c: &mut Criterion) {
    let mut alloc = TypedAllocator::new(reference_pool()).unwrap();
    c.bench_function("typed_create_destroy", |b| {
        b.iter(|| {
            let slot = alloc.create(String::from("twin")).unwrap();
            black_box(alloc.get(&slot).len());
            alloc.destroy(slot).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_split_merge_chain,
    bench_fill_and_drain,
    bench_churn,
    bench_typed_create_destroy
);
criterion_main!(benches);
