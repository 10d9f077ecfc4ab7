//! Kernel throughput across element types and sizes.
//!
//! Run with: cargo bench --bench kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lanewise::{axpy, fold_dot, reduce_add, reduce_max, scan_add, sort_into, stats};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::time::Duration;

const SIZES: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_add");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        let mut rng = StdRng::seed_from_u64(42);
        let f64s: Vec<f64> = (0..size).map(|_| rng.sample(StandardNormal)).collect();
        let f32s: Vec<f32> = f64s.iter().map(|&x| x as f32).collect();
        let i32s: Vec<i32> = (0..size).map(|_| rng.gen()).collect();

        group.bench_with_input(BenchmarkId::new("naive_f64", size), &size, |b, _| {
            b.iter(|| black_box(f64s.iter().sum::<f64>()))
        });
        group.bench_with_input(BenchmarkId::new("f64", size), &size, |b, _| {
            b.iter(|| black_box(reduce_add(&f64s)))
        });
        group.bench_with_input(BenchmarkId::new("f32", size), &size, |b, _| {
            b.iter(|| black_box(reduce_add(&f32s)))
        });
        group.bench_with_input(BenchmarkId::new("i32", size), &size, |b, _| {
            b.iter(|| black_box(reduce_add(&i32s)))
        });
        group.bench_with_input(BenchmarkId::new("max_f64", size), &size, |b, _| {
            b.iter(|| black_box(reduce_max(&f64s)))
        });
    }
    group.finish();
}

fn bench_dot_axpy(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_axpy");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        let mut rng = StdRng::seed_from_u64(42);
        let x: Vec<f64> = (0..size).map(|_| rng.sample(StandardNormal)).collect();
        let y: Vec<f64> = (0..size).map(|_| rng.sample(StandardNormal)).collect();
        let mut out = vec![0.0; size];

        group.bench_with_input(BenchmarkId::new("dot", size), &size, |b, _| {
            b.iter(|| black_box(fold_dot(&x, &y).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("axpy", size), &size, |b, _| {
            b.iter(|| {
                axpy(&mut out, &x, &y, 2.5).unwrap();
                black_box(out[0])
            })
        });
    }
    group.finish();
}

fn bench_scan_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_sort");
    group.sample_size(10);

    for size in [1_000usize, 100_000] {
        group.throughput(Throughput::Elements(size as u64));

        let mut rng = StdRng::seed_from_u64(3);
        let keys: Vec<u32> = (0..size).map(|_| rng.gen()).collect();
        let mut out = vec![0u32; size];

        group.bench_with_input(BenchmarkId::new("scan_add", size), &size, |b, _| {
            b.iter(|| {
                scan_add(&mut out, &keys).unwrap();
                black_box(out[size - 1])
            })
        });
        group.bench_with_input(BenchmarkId::new("radix_sort", size), &size, |b, _| {
            b.iter(|| {
                sort_into(&mut out, &keys).unwrap();
                black_box(out[0])
            })
        });
        group.bench_with_input(BenchmarkId::new("std_sort", size), &size, |b, _| {
            b.iter(|| {
                out.copy_from_slice(&keys);
                out.sort_unstable();
                black_box(out[0])
            })
        });
    }
    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");
    group.sample_size(10);

    let size = 100_000usize;
    let mut rng = StdRng::seed_from_u64(5);
    let xs: Vec<f64> = (0..size).map(|_| rng.sample(StandardNormal)).collect();
    let mut window = vec![0.0; size];

    group.bench_function("descriptive", |b| {
        b.iter(|| black_box(stats::descriptive(&xs).unwrap()))
    });
    group.bench_function("sma_50", |b| {
        b.iter(|| black_box(stats::sma(&mut window, &xs, 50).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_reduce, bench_dot_axpy, bench_scan_sort, bench_stats);
criterion_main!(benches);
