//! Performance benchmarks for pathrank
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Increment-and-rank throughput on hot and cold keys
//! - Full-range leaderboard reads at varying store sizes
//! - Synthetic path sample generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use pathrank::sampler::{generate_sample, SampleSpec};
use pathrank::CounterStore;

fn store() -> CounterStore {
    CounterStore::new(Duration::from_millis(250))
}

/// Benchmark increments against a single contended key and against a
/// spread of distinct keys
fn bench_increment_and_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("increment_and_rank");

    group.bench_function("hot_key", |b| {
        let store = store();
        b.iter(|| {
            black_box(store.increment_and_rank("/hot/", 1).unwrap());
        });
    });

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("distinct_keys", size), size, |b, &size| {
            b.iter(|| {
                let store = store();
                for i in 0..size {
                    let key = format!("/path/{}/", i);
                    black_box(store.increment_and_rank(&key, 1).unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark full-range reads over stores of varying sizes
fn bench_descending_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("descending_range");

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        let store = store();
        for i in 0..*size {
            let key = format!("/path/{}/", i);
            store.increment_and_rank(&key, (i % 17) as i64 + 1).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("full_range", size), size, |b, _| {
            b.iter(|| {
                black_box(store.descending_range(0, -1).unwrap());
            });
        });

        group.bench_with_input(BenchmarkId::new("top_ten", size), size, |b, _| {
            b.iter(|| {
                black_box(store.descending_range(0, 9).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark sample path generation
fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");
    let spec = SampleSpec::default();

    for count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("generate", count), count, |b, &count| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                black_box(generate_sample(&mut rng, count, &spec));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_increment_and_rank,
    bench_descending_range,
    bench_sampler
);
criterion_main!(benches);
