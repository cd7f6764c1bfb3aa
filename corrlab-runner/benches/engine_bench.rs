//! Criterion benchmarks for the correlation battery hot paths.
//!
//! Run with: `cargo bench -p corrlab-runner`
//!
//! Measures:
//! - The three correlation tests on one column pair
//! - A full stratified battery, parallel vs sequential

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use corrlab_core::stats::cor_test;
use corrlab_core::{Alternative, Column, Dataset, Method, MissingPolicy};
use corrlab_runner::{run_correlations, CorrelationConfig, StratificationMode};

/// Deterministic pseudo-random column (LCG), roughly uniform on [0, 100).
fn synthetic(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64 * 100.0
        })
        .collect()
}

fn synthetic_dataset(rows: usize, predictors: usize) -> Dataset {
    let mut columns = vec![Column::from_f64("y", &synthetic(rows, 1))];
    for p in 0..predictors {
        columns.push(Column::from_f64(format!("x{p}"), &synthetic(rows, p as u64 + 2)));
    }
    let groups: Vec<f64> = (0..rows).map(|i| (i % 5) as f64).collect();
    let sides: Vec<&str> = (0..rows).map(|i| if i % 2 == 0 { "l" } else { "r" }).collect();
    columns.push(Column::from_f64("grp", &groups));
    columns.push(Column::from_strs("side", &sides));
    Dataset::new(columns).unwrap()
}

/// One test per method across sample sizes
fn bench_cor_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("cor_test");

    for n in [30usize, 300, 3000] {
        let x: Vec<Option<f64>> = synthetic(n, 7).into_iter().map(Some).collect();
        let y: Vec<Option<f64>> = synthetic(n, 8).into_iter().map(Some).collect();
        for method in Method::ALL {
            group.bench_with_input(BenchmarkId::new(method.as_str(), n), &n, |b, _| {
                b.iter(|| {
                    let _ = cor_test(
                        black_box(&x),
                        black_box(&y),
                        method,
                        Alternative::TwoSided,
                        MissingPolicy::Everything,
                    );
                });
            });
        }
    }

    group.finish();
}

/// Full crossed battery
fn bench_battery(c: &mut Criterion) {
    let mut group = c.benchmark_group("battery");
    let ds = synthetic_dataset(2000, 20);

    for parallel in [true, false] {
        let mut cfg = CorrelationConfig::new("y", &["starts_with(x)"]);
        cfg.stratification_vars = vec!["grp".into(), "side".into()];
        cfg.stratification_mode = StratificationMode::Crossed;
        cfg.parallel = parallel;
        let label = if parallel { "parallel" } else { "sequential" };

        group.bench_function(label, |b| {
            b.iter(|| {
                let _ = run_correlations(black_box(&ds), black_box(&cfg));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cor_test, bench_battery);
criterion_main!(benches);
