//! Stream-compaction benchmarks.
//!
//! Compares LUT-driven `filter_gt` / `partition_gt` against an
//! iterator-based scalar filter at several selectivities.
//!
//! Run with: cargo bench -p lanewise-kernel --bench compaction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lanewise_kernel::{filter_gt, partition_gt, unique_adjacent};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_gt");
    group.sample_size(20);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let size = 1 << 16;
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<i32> = (0..size).map(|_| rng.gen_range(0..100)).collect();
    let mut out = vec![0i32; size];
    group.throughput(Throughput::Elements(size as u64));

    // Threshold t keeps roughly (99 - t)% of the input.
    for threshold in [0, 49, 89, 98] {
        group.bench_with_input(BenchmarkId::new("scalar", threshold), &threshold, |b, &t| {
            b.iter(|| {
                let mut n = 0;
                for &x in &data {
                    if x > t {
                        out[n] = x;
                        n += 1;
                    }
                }
                black_box(n)
            })
        });

        group.bench_with_input(BenchmarkId::new("lut", threshold), &threshold, |b, &t| {
            b.iter(|| black_box(filter_gt(&mut out, &data, t).unwrap()))
        });
    }
    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_gt");
    group.sample_size(20);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for size in [1_000usize, 100_000] {
        let mut rng = StdRng::seed_from_u64(7);
        let data: Vec<f64> = (0..size).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut pass = vec![0.0; size];
        let mut fail = vec![0.0; size];
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("lut", size), &size, |b, _| {
            b.iter(|| black_box(partition_gt(&mut pass, &mut fail, &data, 0.0).unwrap()))
        });
    }
    group.finish();
}

fn bench_unique(c: &mut Criterion) {
    let mut group = c.benchmark_group("unique_adjacent");
    group.sample_size(20);

    let size = 100_000usize;
    let mut rng = StdRng::seed_from_u64(11);
    // Runs of average length ~4.
    let mut data = Vec::with_capacity(size);
    let mut v = 0i64;
    while data.len() < size {
        v += 1;
        for _ in 0..rng.gen_range(1..8) {
            data.push(v);
        }
    }
    data.truncate(size);
    let mut out = vec![0i64; size];
    group.throughput(Throughput::Elements(size as u64));

    group.bench_function("lut", |b| {
        b.iter(|| black_box(unique_adjacent(&mut out, &data).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_filter, bench_partition, bench_unique);
criterion_main!(benches);
