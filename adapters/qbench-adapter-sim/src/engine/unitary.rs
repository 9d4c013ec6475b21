//! Full-unitary simulation engine.
//!
//! Builds the 2^n x 2^n matrix of a gate sequence, then applies it to a
//! state. Memory grows as 4^n, so this engine is only practical for small
//! circuits.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use qbench_ir::{Circuit, Instruction};

use crate::engine::Statevector;

/// The unitary matrix of a circuit.
#[derive(Debug, Clone)]
pub struct Unitary {
    matrix: Array2<Complex64>,
    num_qubits: usize,
}

impl Unitary {
    /// Build the unitary of the gates in `circuit`.
    ///
    /// Column `j` is the circuit applied to basis state |j⟩. Non-gate
    /// instructions are skipped.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let num_qubits = circuit.num_qubits();
        let dim = 1usize << num_qubits;
        let gates: Vec<&Instruction> = circuit
            .instructions()
            .iter()
            .filter(|inst| inst.is_gate())
            .collect();

        let mut matrix = Array2::<Complex64>::zeros((dim, dim));
        for j in 0..dim {
            let mut column = Statevector::basis_state(num_qubits, j);
            for inst in &gates {
                column.apply(inst);
            }
            matrix
                .column_mut(j)
                .assign(&Array1::from(column.into_amplitudes()));
        }

        Self { matrix, num_qubits }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The matrix.
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Apply the unitary to |0...0⟩.
    pub fn apply_to_zero_state(&self) -> Vec<Complex64> {
        let dim = self.matrix.nrows();
        let mut zero = Array1::<Complex64>::zeros(dim);
        zero[0] = Complex64::new(1.0, 0.0);
        self.matrix.dot(&zero).to_vec()
    }

    /// Bytes held by the matrix.
    pub fn memory_bytes(&self) -> u64 {
        (self.matrix.len() * std::mem::size_of::<Complex64>()) as u64
    }

    /// Check `U^† U = I` within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let product = self.matrix.t().mapv(|z| z.conj()).dot(&self.matrix);
        product.indexed_iter().all(|((i, j), &z)| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (z - Complex64::new(expected, 0.0)).norm() < tolerance
        })
    }
}
