//! Benchmarks for the minima search and basis layout
//!
//! Run with: cargo bench -p vchos-flux

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vchos_flux::{
    DeviceParameters, FluxPotential, FluxQubitVchosSqueezing, MinimaSearch, PotentialProvider, SearchConfig,
    normalize,
};
use vchos_optim::NelderMead;

const EJ: [f64; 3] = [1.0, 1.0, 0.8];

/// Benchmark potential evaluation and derivatives
fn bench_potential(c: &mut Criterion) {
    let mut group = c.benchmark_group("potential");
    let potential = FluxPotential::new(EJ, 0.46);
    let phi = [0.84, -0.84];

    group.bench_function("value", |b| b.iter(|| potential.potential(black_box(&phi))));
    group.bench_function("gradient", |b| b.iter(|| potential.gradient(black_box(&phi))));
    group.bench_function("hessian", |b| b.iter(|| potential.hessian(black_box(&phi))));
    group.bench_function("normalize", |b| b.iter(|| normalize(black_box(&[7.5, -9.1]))));

    group.finish();
}

/// Benchmark the full search across flux biases
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("minima_search");

    for flux in &[0.0, 0.25, 0.46, 0.5] {
        let potential = FluxPotential::new(EJ, *flux);
        group.bench_with_input(BenchmarkId::new("bfgs", flux), &potential, |b, p| {
            let search = MinimaSearch::new(SearchConfig::default());
            b.iter(|| search.run(black_box(p)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("bfgs_parallel", flux), &potential, |b, p| {
            let search = MinimaSearch::new(SearchConfig::default().with_parallel(true));
            b.iter(|| search.run(black_box(p)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("nelder_mead", flux), &potential, |b, p| {
            let search = MinimaSearch::with_optimizer(NelderMead::new(), SearchConfig::default());
            b.iter(|| search.run(black_box(p)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark layout construction after a parameter change
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("basis_layout");

    for num_exc in &[2_u32, 4, 8] {
        group.bench_with_input(BenchmarkId::new("squeezed", num_exc), num_exc, |b, &n| {
            let mut qubit = FluxQubitVchosSqueezing::vchos(DeviceParameters::default_params(), n).unwrap();
            let mut flux = 0.46;
            b.iter(|| {
                flux = if flux == 0.46 { 0.47 } else { 0.46 };
                qubit.set_param("flux", flux).unwrap();
                qubit.hilbert_dim().unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_potential, bench_search, bench_layout);
criterion_main!(benches);
