use lanewise::{filter_gt, fold_dot, map_into, reduce_add, scan_add, Element};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::hint::black_box;
use std::time::{Duration, Instant};

fn median(durations: &mut [Duration]) -> Duration {
    durations.sort();
    durations[durations.len() / 2]
}

fn bench_n(label: &str, warmup_iters: usize, iters: usize, mut f: impl FnMut()) -> Duration {
    for _ in 0..warmup_iters {
        f();
    }

    let mut samples = Vec::with_capacity(iters);
    for _ in 0..iters {
        let t0 = Instant::now();
        f();
        samples.push(t0.elapsed());
    }

    let med = median(&mut samples);
    println!("{label}: {:.3} us", med.as_secs_f64() * 1e6);
    med
}

/// Pick an iteration count so each label runs for roughly `budget`.
fn bench_adaptive(label: &str, budget: Duration, mut f: impl FnMut()) -> Duration {
    let t0 = Instant::now();
    f();
    let once = t0.elapsed().max(Duration::from_nanos(1));
    let iters = (budget.as_nanos() / once.as_nanos()).clamp(5, 10_000) as usize;
    bench_n(label, 2, iters, f)
}

fn report(scalar: Duration, lanes: Duration) {
    let speedup = scalar.as_secs_f64() / lanes.as_secs_f64().max(1e-12);
    println!("  speedup: {speedup:.2}x");
}

fn make_random(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.sample(StandardNormal)).collect()
}

fn compare_sum<T: Element + lanewise::MaybeSimdOps>(label: &str, data: &[T]) {
    println!("=== sum<{label}> n={} ===", data.len());
    let budget = Duration::from_millis(200);
    let scalar = bench_adaptive("scalar", budget, || {
        black_box(data.iter().fold(T::ZERO, |acc, &x| acc.lane_add(x)));
    });
    let lanes = bench_adaptive("lanewise", budget, || {
        black_box(reduce_add(data));
    });
    report(scalar, lanes);
}

fn main() {
    println!("Rust runner: benches/scalar_compare.rs");
    println!("Note: single-threaded, median of timed iterations.");
    println!();

    let n = 1 << 20;
    let budget = Duration::from_millis(200);
    let a = make_random(n, 0);
    let b = make_random(n, 1);

    compare_sum("f64", &a);
    let a32: Vec<f32> = a.iter().map(|&x| x as f32).collect();
    compare_sum("f32", &a32);
    let mut rng = StdRng::seed_from_u64(2);
    let ints: Vec<i16> = (0..n).map(|_| rng.gen()).collect();
    compare_sum("i16", &ints);
    println!();

    {
        println!("=== dot n={n} ===");
        let scalar = bench_adaptive("scalar", budget, || {
            black_box(a.iter().zip(&b).fold(0.0, |s, (x, y)| s + x * y));
        });
        let lanes = bench_adaptive("lanewise", budget, || {
            black_box(fold_dot(&a, &b).unwrap());
        });
        report(scalar, lanes);
        println!();
    }

    {
        println!("=== map x*2+1 n={n} ===");
        let mut out = vec![0.0; n];
        let scalar = bench_adaptive("scalar", budget, || {
            for (o, &x) in out.iter_mut().zip(&a) {
                *o = x * 2.0 + 1.0;
            }
            black_box(out[0]);
        });
        let lanes = bench_adaptive("lanewise", budget, || {
            map_into(&mut out, &a, |x: f64| x * 2.0 + 1.0).unwrap();
            black_box(out[0]);
        });
        report(scalar, lanes);
        println!();
    }

    {
        println!("=== inclusive scan n={n} ===");
        let mut out = vec![0.0; n];
        let scalar = bench_adaptive("scalar", budget, || {
            let mut acc = 0.0;
            for (o, &x) in out.iter_mut().zip(&a) {
                acc += x;
                *o = acc;
            }
            black_box(out[n - 1]);
        });
        let lanes = bench_adaptive("lanewise", budget, || {
            scan_add(&mut out, &a).unwrap();
            black_box(out[n - 1]);
        });
        report(scalar, lanes);
        println!();
    }

    {
        println!("=== filter x > 0 n={n} ===");
        let mut out = vec![0.0; n];
        let scalar = bench_adaptive("scalar", budget, || {
            let mut k = 0;
            for &x in &a {
                if x > 0.0 {
                    out[k] = x;
                    k += 1;
                }
            }
            black_box(k);
        });
        let lanes = bench_adaptive("lanewise", budget, || {
            black_box(filter_gt(&mut out, &a, 0.0).unwrap());
        });
        report(scalar, lanes);
    }
}
