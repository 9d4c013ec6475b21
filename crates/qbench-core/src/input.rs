//! Circuit input: parsing and a structural summary for the report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use qbench_ir::Circuit;

use crate::error::InputShapeError;

/// Size and shape of the benchmarked circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSummary {
    pub name: String,
    pub num_qubits: usize,
    pub num_clbits: usize,
    pub depth: usize,
    pub gate_count: usize,
    pub two_qubit_gates: usize,
    pub gate_counts: BTreeMap<String, usize>,
    /// Fingerprint of the QASM source, empty when built from a circuit.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_hash: String,
}

impl CircuitSummary {
    pub fn of(circuit: &Circuit) -> Self {
        Self {
            name: circuit.name().to_string(),
            num_qubits: circuit.num_qubits(),
            num_clbits: circuit.num_clbits(),
            depth: circuit.depth(),
            gate_count: circuit.gate_count(),
            two_qubit_gates: circuit.two_qubit_gate_count(),
            gate_counts: circuit.gate_counts(),
            content_hash: String::new(),
        }
    }
}

/// A parsed circuit with its summary.
#[derive(Debug, Clone)]
pub struct CircuitInput {
    pub circuit: Circuit,
    pub summary: CircuitSummary,
}

impl CircuitInput {
    /// Parse OpenQASM 2.0 source.
    pub fn from_qasm(source: &str) -> Result<Self, InputShapeError> {
        let circuit = qbench_qasm::parse(source)?;
        let summary = CircuitSummary {
            content_hash: content_fingerprint(source),
            ..CircuitSummary::of(&circuit)
        };
        Ok(Self { circuit, summary })
    }

    /// Wrap an already-built circuit.
    pub fn from_circuit(circuit: Circuit) -> Self {
        let summary = CircuitSummary::of(&circuit);
        Self { circuit, summary }
    }
}

/// DJB2a and FNV-1a side by side. Not cryptographic.
fn content_fingerprint(input: &str) -> String {
    let mut h1: u64 = 5381;
    let mut h2: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in input.as_bytes() {
        h1 = h1.wrapping_mul(33) ^ u64::from(b);
        h2 ^= u64::from(b);
        h2 = h2.wrapping_mul(0x0100_0000_01b3);
    }
    format!("{h1:016x}{h2:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELL: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
h q[0];
cx q[0], q[1];
measure q[0] -> c[0];
measure q[1] -> c[1];
"#;

    #[test]
    fn test_from_qasm() {
        let input = CircuitInput::from_qasm(BELL).unwrap();
        assert_eq!(input.summary.num_qubits, 2);
        assert_eq!(input.summary.gate_count, 2);
        assert_eq!(input.summary.two_qubit_gates, 1);
        assert_eq!(input.summary.gate_counts["cx"], 1);
        assert_eq!(input.summary.content_hash.len(), 32);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(content_fingerprint(BELL), content_fingerprint(BELL));
        assert_ne!(content_fingerprint(BELL), content_fingerprint("OPENQASM 2.0;"));
    }

    #[test]
    fn test_malformed_qasm() {
        let err = CircuitInput::from_qasm("OPENQASM 2.0;\nqreg q[1];\nfoo q[0];\n").unwrap_err();
        assert!(matches!(err, InputShapeError::Circuit(_)));
    }
}
