//! Criterion micro-benchmarks for second-chance cache lookups.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use twin_bench::{reference_cache, stress_cache};
use twin_cache::SecondChanceCache;
use twin_test_utils::{Page, Workload};

/// Benchmark: repeated hits on a fully resident working set.
fn bench_hits(c: &mut Criterion) {
    let mut cache: SecondChanceCache<u64, Page> = SecondChanceCache::new(reference_cache()).unwrap();
    for key in 0..64 {
        cache.get(&key).unwrap();
    }
    let mut key = 0u64;
    c.bench_function("cache_hit_64", |b| {
        b.iter(|| {
            black_box(cache.get(&key).unwrap().id);
            key = (key + 1) % 64;
        });
    });
}

/// Benchmark: a skewed 10K-lookup stream that keeps evicting.
fn bench_skewed_stream(c: &mut Criterion) {
    let keys = Workload::new(99).keys(10_000, 512, 32);
    c.bench_function("cache_skewed_10k", |b| {
        b.iter(|| {
            let mut cache: SecondChanceCache<u64, Page> =
                SecondChanceCache::new(reference_cache()).unwrap();
            for key in &keys {
                black_box(cache.get(key).unwrap().reads);
            }
            black_box(cache.stats().evictions);
        });
    });
}

/// Benchmark: misses on a full 1024-entry cache, where every lookup scans
/// the whole ring before evicting.
fn bench_scan_heavy_misses(c: &mut Criterion) {
    let mut cache: SecondChanceCache<u64, Page> = SecondChanceCache::new(stress_cache()).unwrap();
    let mut key = 0u64;
    c.bench_function("cache_miss_1024", |b| {
        b.iter(|| {
            black_box(cache.get(&key).unwrap().id);
            key += 1;
        });
    });
}

criterion_group!(
    benches,
    bench_hits,
    bench_skewed_stream,
    bench_scan_heavy_misses
);
criterion_main!(benches);
