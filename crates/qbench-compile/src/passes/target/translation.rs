//! Basis translation passes.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use qbench_ir::{Circuit, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, PropertySet};

/// Basis translation pass.
///
/// Rewrites every gate outside the target basis with a fixed decomposition,
/// repeating until only basis gates remain. Decompositions are exact up to
/// global phase and bottom out in `rx`, `ry`, `rz` and `cx`; a gate that
/// cannot reach the basis fails with [`CompileError::UntranslatableGate`].
pub struct BasisTranslation;

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let Some(basis) = properties.basis_gates.as_ref() else {
            return Ok(());
        };

        let mut translated = circuit.clone_empty();
        for instruction in circuit.instructions() {
            let mut worklist = vec![instruction.clone()];
            while let Some(inst) = worklist.pop() {
                let Some(gate) = inst.as_gate().copied() else {
                    translated.push(inst)?;
                    continue;
                };
                if basis.contains(gate.name()) {
                    translated.push(inst)?;
                    continue;
                }
                let replacement = decompose(gate, &inst.qubits)
                    .filter(|r| reaches_basis(r, basis))
                    .ok_or_else(|| CompileError::UntranslatableGate(gate.name().to_string()))?;
                // Stack order: push in reverse so the first replacement runs first.
                worklist.extend(replacement.into_iter().rev());
            }
        }

        *circuit = translated;
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}

/// A replacement is useful only if each of its gates is in the basis or can
/// itself be decomposed. Checked one level deep per step, which is enough to
/// reject a basis missing `cx` or a rotation before the worklist grows.
fn reaches_basis(replacement: &[Instruction], basis: &BasisGates) -> bool {
    replacement.iter().all(|inst| {
        inst.as_gate()
            .is_none_or(|g| basis.contains(g.name()) || decompose(*g, &inst.qubits).is_some())
    })
}

fn g1(gate: StandardGate, q: QubitId) -> Instruction {
    Instruction::single_qubit_gate(gate, q)
}

fn cx(control: QubitId, target: QubitId) -> Instruction {
    Instruction::two_qubit_gate(StandardGate::CX, control, target)
}

/// One decomposition step for `gate` on `qubits`, or `None` for the
/// primitive gates `rx`, `ry`, `rz` and `cx`.
fn decompose(gate: StandardGate, qubits: &[QubitId]) -> Option<Vec<Instruction>> {
    use StandardGate::*;

    let a = qubits[0];
    let rules = match gate {
        I => vec![],
        X => vec![g1(Rx(PI), a)],
        Y => vec![g1(Ry(PI), a)],
        Z => vec![g1(Rz(PI), a)],
        H => vec![g1(Rz(PI), a), g1(Ry(FRAC_PI_2), a)],
        S => vec![g1(Rz(FRAC_PI_2), a)],
        Sdg => vec![g1(Rz(-FRAC_PI_2), a)],
        T => vec![g1(Rz(FRAC_PI_4), a)],
        Tdg => vec![g1(Rz(-FRAC_PI_4), a)],
        SX => vec![g1(Rx(FRAC_PI_2), a)],
        SXdg => vec![g1(Rx(-FRAC_PI_2), a)],
        P(lambda) => vec![g1(Rz(lambda), a)],
        U(theta, phi, lambda) => vec![g1(Rz(lambda), a), g1(Ry(theta), a), g1(Rz(phi), a)],
        Rx(_) | Ry(_) | Rz(_) | CX => return None,
        _ => {
            let b = qubits[1];
            match gate {
                CY => vec![g1(Sdg, b), cx(a, b), g1(S, b)],
                CZ => vec![g1(H, b), cx(a, b), g1(H, b)],
                CH => vec![
                    g1(H, b),
                    g1(Sdg, b),
                    cx(a, b),
                    g1(H, b),
                    g1(T, b),
                    cx(a, b),
                    g1(T, b),
                    g1(H, b),
                    g1(S, b),
                    g1(X, b),
                    g1(S, a),
                ],
                Swap => vec![cx(a, b), cx(b, a), cx(a, b)],
                CRx(theta) => vec![
                    g1(P(FRAC_PI_2), b),
                    cx(a, b),
                    g1(U(-theta / 2.0, 0.0, 0.0), b),
                    cx(a, b),
                    g1(U(theta / 2.0, -FRAC_PI_2, 0.0), b),
                ],
                CRy(theta) => vec![
                    g1(Ry(theta / 2.0), b),
                    cx(a, b),
                    g1(Ry(-theta / 2.0), b),
                    cx(a, b),
                ],
                CRz(theta) => vec![
                    g1(Rz(theta / 2.0), b),
                    cx(a, b),
                    g1(Rz(-theta / 2.0), b),
                    cx(a, b),
                ],
                CP(lambda) => vec![
                    g1(P(lambda / 2.0), a),
                    cx(a, b),
                    g1(P(-lambda / 2.0), b),
                    cx(a, b),
                    g1(P(lambda / 2.0), b),
                ],
                RZZ(theta) => vec![cx(a, b), g1(Rz(theta), b), cx(a, b)],
                CCX => {
                    let c = qubits[2];
                    vec![
                        g1(H, c),
                        cx(b, c),
                        g1(Tdg, c),
                        cx(a, c),
                        g1(T, c),
                        cx(b, c),
                        g1(Tdg, c),
                        cx(a, c),
                        g1(T, b),
                        g1(T, c),
                        g1(H, c),
                        cx(a, b),
                        g1(T, a),
                        g1(Tdg, b),
                        cx(a, b),
                    ]
                }
                CSwap => {
                    let c = qubits[2];
                    vec![
                        cx(c, b),
                        Instruction::gate(CCX, [a, b, c]),
                        cx(c, b),
                    ]
                }
                _ => return None,
            }
        }
    };
    Some(rules)
}
