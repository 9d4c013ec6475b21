//! Cross-checks between the local simulators.

use std::f64::consts::PI;

use qbench_adapter_sim::{SamplerBackend, StatevectorBackend, UnitaryBackend};
use qbench_hal::{Backend, RawOutcome};
use qbench_ir::{Circuit, QubitId, StandardGate};

async fn probabilities(backend: &dyn Backend, circuit: &Circuit) -> Vec<f64> {
    let transpiled = backend.transpile(circuit).unwrap();
    let job_id = backend.submit(&transpiled.circuit, 1).await.unwrap();
    match backend.wait(&job_id).await.unwrap().outcome {
        RawOutcome::Statevector(amps) => amps.iter().map(|a| a.norm_sqr()).collect(),
        RawOutcome::Counts(_) => panic!("expected amplitudes"),
    }
}

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!((x - y).abs() < 1e-9, "index {i}: {x} vs {y}");
    }
}

/// A three-qubit circuit touching every gate the IR knows.
fn all_gates() -> Circuit {
    let q = |i| QubitId(i);
    let mut c = Circuit::with_size("all_gates", 3, 0);
    let gates = vec![
        (StandardGate::H, vec![q(0)]),
        (StandardGate::Rx(0.3), vec![q(1)]),
        (StandardGate::Ry(1.1), vec![q(2)]),
        (StandardGate::X, vec![q(2)]),
        (StandardGate::Y, vec![q(1)]),
        (StandardGate::Z, vec![q(0)]),
        (StandardGate::S, vec![q(1)]),
        (StandardGate::Sdg, vec![q(2)]),
        (StandardGate::T, vec![q(0)]),
        (StandardGate::Tdg, vec![q(1)]),
        (StandardGate::SX, vec![q(2)]),
        (StandardGate::SXdg, vec![q(0)]),
        (StandardGate::Rz(0.7), vec![q(1)]),
        (StandardGate::P(PI / 5.0), vec![q(2)]),
        (StandardGate::U(0.4, 0.5, 0.6), vec![q(0)]),
        (StandardGate::CX, vec![q(0), q(1)]),
        (StandardGate::CY, vec![q(1), q(2)]),
        (StandardGate::CZ, vec![q(2), q(0)]),
        (StandardGate::CH, vec![q(0), q(2)]),
        (StandardGate::Swap, vec![q(0), q(1)]),
        (StandardGate::CRx(0.2), vec![q(0), q(1)]),
        (StandardGate::CRy(0.6), vec![q(2), q(0)]),
        (StandardGate::CRz(0.9), vec![q(1), q(2)]),
        (StandardGate::CP(1.3), vec![q(2), q(1)]),
        (StandardGate::RZZ(0.8), vec![q(0), q(2)]),
        (StandardGate::H, vec![q(1)]),
        (StandardGate::CCX, vec![q(0), q(1), q(2)]),
        (StandardGate::CSwap, vec![q(2), q(0), q(1)]),
    ];
    for (gate, qubits) in gates {
        c.gate(gate, qubits).unwrap();
    }
    c
}

#[tokio::test]
async fn test_bell_agrees_across_simulators() {
    let circuit = Circuit::bell().unwrap();
    let expected = vec![0.5, 0.0, 0.0, 0.5];

    assert_close(&probabilities(&StatevectorBackend::new(), &circuit).await, &expected);
    assert_close(&probabilities(&UnitaryBackend::new(), &circuit).await, &expected);

    let sampler = SamplerBackend::new().with_seed(7);
    let transpiled = sampler.transpile(&circuit).unwrap();
    let job_id = sampler.submit(&transpiled.circuit, 2000).await.unwrap();
    let RawOutcome::Counts(counts) = sampler.wait(&job_id).await.unwrap().outcome else {
        panic!("expected counts");
    };
    assert_eq!(counts.total_shots(), 2000);
    assert_eq!(counts.get("01") + counts.get("10"), 0);
}

#[tokio::test]
async fn test_basis_translation_preserves_state() {
    let circuit = all_gates();
    let exact = probabilities(&StatevectorBackend::new(), &circuit).await;
    let translated = probabilities(&UnitaryBackend::new(), &circuit).await;
    assert_close(&exact, &translated);
}

#[tokio::test]
async fn test_routed_circuit_matches_exact_distribution() {
    // x on qubit 0 then a long-range cx: a deterministic outcome survives routing.
    let mut circuit = Circuit::with_size("long_range", 4, 4);
    circuit
        .x(QubitId(0))
        .unwrap()
        .cx(QubitId(0), QubitId(3))
        .unwrap()
        .h(QubitId(1))
        .unwrap()
        .h(QubitId(1))
        .unwrap();

    let sampler = SamplerBackend::new().with_seed(1);
    let transpiled = sampler.transpile(&circuit).unwrap();
    assert!(transpiled.swaps_inserted.unwrap_or(0) > 0);

    let job_id = sampler.submit(&transpiled.circuit, 100).await.unwrap();
    let RawOutcome::Counts(counts) = sampler.wait(&job_id).await.unwrap().outcome else {
        panic!("expected counts");
    };
    assert_eq!(counts.get("1001"), 100);
}
