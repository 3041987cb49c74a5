//! Benchmarks for CFR solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cfr_engine::cfr::strategy::regret_matching;
use cfr_engine::cfr::{CfrConfig, CfrSolver};
use cfr_engine::games::tictactoe::TicTacToe;

fn vanilla_iteration_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tictactoe_vanilla");
    group.sample_size(10);

    let config = CfrConfig::vanilla();
    let mut solver = CfrSolver::new(TicTacToe::default(), config).unwrap();
    group.bench_function("single_iteration", |b| {
        b.iter(|| {
            solver.run_iteration().unwrap();
            black_box(solver.iteration())
        })
    });
    group.finish();
}

fn outcome_sampling_benchmark(c: &mut Criterion) {
    c.bench_function("tictactoe_outcome_sampling_1000_iterations", |b| {
        b.iter(|| {
            let config = CfrConfig::outcome_sampling().with_seed(42);
            let mut solver = CfrSolver::new(TicTacToe::default(), config).unwrap();
            solver.train(black_box(1000)).unwrap().info_sets
        })
    });
}

fn regret_matching_benchmark(c: &mut Criterion) {
    let regrets: Vec<f64> = (0..9).map(|i| i as f64 - 4.0).collect();
    c.bench_function("regret_matching_9_actions", |b| {
        b.iter(|| regret_matching(black_box(&regrets)))
    });
}

criterion_group!(
    benches,
    vanilla_iteration_benchmark,
    outcome_sampling_benchmark,
    regret_matching_benchmark
);
criterion_main!(benches);
