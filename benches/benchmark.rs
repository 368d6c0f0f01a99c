//! Benchmarks for the RK4 trajectory integrator: one default-length run, and a
//! small parallel batch of runs with nearby initial conditions.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use double_pendulum::pendulum::{
    parameters::{PendulumParameters, State},
    trajectory::{integrate, integrate_batch, SimulationRun},
};

fn benchmark(c: &mut Criterion) {
    let params = PendulumParameters::default();
    let initial_state = State::from_degrees(175.0, 175.0, 0.0, 0.0);

    c.bench_function("integrate_60s", |b| {
        b.iter(|| integrate(black_box(&initial_state), black_box(&params), 60.0, 0.01));
    });

    let runs: Vec<SimulationRun> = (0..16)
        .map(|i| SimulationRun {
            initial_state: State::from_degrees(175.0 + 0.01 * i as f64, 175.0, 0.0, 0.0),
            params,
            t_max: 10.0,
            dt: 0.01,
        })
        .collect();
    c.bench_function("integrate_batch_16x10s", |b| {
        b.iter(|| integrate_batch(black_box(&runs)));
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
