//! Benchmarks for normalization and fidelity scoring
//!
//! Run with: cargo bench -p qbench-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_complex::Complex64;

use qbench_core::{Distribution, distribution_from_statevector, fidelity};

/// Uniform superposition over `n` qubits.
fn uniform_state(n: u32) -> Vec<Complex64> {
    let dim = 1usize << n;
    let amp = 1.0 / (dim as f64).sqrt();
    vec![Complex64::new(amp, 0.0); dim]
}

fn bench_normalize_statevector(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_statevector");

    for n in &[4u32, 8, 12, 16] {
        let state = uniform_state(*n);
        group.bench_with_input(BenchmarkId::new("qubits", n), &state, |b, state| {
            b.iter(|| distribution_from_statevector(black_box(state)).unwrap());
        });
    }

    group.finish();
}

fn bench_fidelity(c: &mut Criterion) {
    let mut group = c.benchmark_group("fidelity");

    for n in &[4u32, 8, 12, 16] {
        let p: Distribution = distribution_from_statevector(&uniform_state(*n)).unwrap();
        // Half the support shared.
        let q: Distribution = p
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 0)
            .map(|(_, (k, v))| (k.clone(), v * 2.0))
            .collect();
        group.bench_with_input(BenchmarkId::new("qubits", n), &(p, q), |b, (p, q)| {
            b.iter(|| fidelity(black_box(p), black_box(q)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize_statevector, bench_fidelity);
criterion_main!(benches);
