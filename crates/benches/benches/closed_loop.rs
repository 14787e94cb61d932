use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use heatmpc_backend::ClarabelBackend;
use heatmpc_benches::{bench_config, random_temperature, HORIZONS};
use heatmpc_control::{build_horizon_problem, plan, simulate};
use heatmpc_core::HeatingConfig;
use rand::{rngs::SmallRng, SeedableRng};

fn formulation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_horizon_problem");
    for horizon in HORIZONS {
        let config = bench_config(horizon);
        group.bench_with_input(BenchmarkId::from_parameter(horizon), &config, |b, config| {
            b.iter(|| build_horizon_problem(config, black_box(18.0)).unwrap());
        });
    }
    group.finish();
}

fn plan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    let mut rng = SmallRng::seed_from_u64(42);
    for horizon in HORIZONS {
        let config = bench_config(horizon);
        group.bench_with_input(BenchmarkId::from_parameter(horizon), &config, |b, config| {
            let mut solver = ClarabelBackend::default();
            b.iter_batched(
                || random_temperature(config, &mut rng),
                |temp| plan(config, &mut solver, temp).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn closed_loop_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("closed_loop");
    group.sample_size(10);
    let config = HeatingConfig {
        steps: Some(24),
        ..bench_config(24)
    };
    group.bench_function("horizon=24_steps=24", |b| {
        b.iter(|| simulate(&config, &mut ClarabelBackend::default()).unwrap());
    });
    group.finish();
}

criterion_group!(
    benches,
    formulation_benchmark,
    plan_benchmark,
    closed_loop_benchmark
);
criterion_main!(benches);
