//! Optimization passes.

use qbench_ir::{Circuit, Instruction, StandardGate};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Tolerance for angle comparisons.
const EPSILON: f64 = 1e-10;

/// Removes gates that act as the identity, such as `id` or `rz(0)`.
pub struct RemoveIdentities;

impl Pass for RemoveIdentities {
    fn name(&self) -> &'static str {
        "RemoveIdentities"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut kept = circuit.clone_empty();
        for inst in circuit.instructions() {
            if inst.as_gate().is_some_and(|g| g.is_identity(EPSILON)) {
                continue;
            }
            kept.push(inst.clone())?;
        }
        *circuit = kept;
        Ok(())
    }
}

/// Cancels adjacent inverse pairs and merges adjacent rotations.
///
/// Two gates are adjacent when no other instruction touches any of their
/// qubits in between. Adjacent gates on the same operand list are removed
/// when one is the inverse of the other (`h h`, `cx cx`, `s sdg`); adjacent
/// rotations of the same axis (`rx`, `ry`, `rz`, `p`, `cp`, `rzz`) are fused
/// into one, and dropped if the fused angle is trivial. Measurements, resets
/// and barriers block cancellation across them.
///
/// The pass repeats until nothing changes, so `h x x h` collapses entirely.
pub struct CancelInverses;

impl Pass for CancelInverses {
    fn name(&self) -> &'static str {
        "CancelInverses"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        loop {
            let (output, changed) = cancel_once(circuit);
            if !changed {
                return Ok(());
            }
            let mut next = circuit.clone_empty();
            for inst in output.into_iter().flatten() {
                next.push(inst)?;
            }
            *circuit = next;
        }
    }
}

/// Fuse two gates of the same rotation family, if they are one.
fn merge(prev: StandardGate, next: StandardGate) -> Option<StandardGate> {
    use StandardGate::*;
    Some(match (prev, next) {
        (Rx(a), Rx(b)) => Rx(a + b),
        (Ry(a), Ry(b)) => Ry(a + b),
        (Rz(a), Rz(b)) => Rz(a + b),
        (P(a), P(b)) => P(a + b),
        (CP(a), CP(b)) => CP(a + b),
        (RZZ(a), RZZ(b)) => RZZ(a + b),
        _ => return None,
    })
}

/// `Some(None)` when the pair vanishes, `Some(Some(g))` when it fuses into `g`.
fn combine(prev: StandardGate, next: StandardGate) -> Option<Option<StandardGate>> {
    if prev.inverse() == next {
        return Some(None);
    }
    let merged = merge(prev, next)?;
    Some((!merged.is_identity(EPSILON)).then_some(merged))
}

/// One sweep over the circuit. Each qubit keeps a stack of indices into the
/// output of the instructions that touched it, so removing a pair exposes the
/// instruction before it.
fn cancel_once(circuit: &Circuit) -> (Vec<Option<Instruction>>, bool) {
    let mut output: Vec<Option<Instruction>> = Vec::with_capacity(circuit.instructions().len());
    let mut stacks: Vec<Vec<usize>> = vec![vec![]; circuit.num_qubits()];
    let mut changed = false;

    for inst in circuit.instructions() {
        if let Some(&gate) = inst.as_gate() {
            let top = inst
                .qubits
                .first()
                .and_then(|q| stacks[q.index()].last().copied());
            let candidate = top.filter(|&idx| {
                inst.qubits
                    .iter()
                    .all(|q| stacks[q.index()].last() == Some(&idx))
                    && output[idx]
                        .as_ref()
                        .is_some_and(|p| p.is_gate() && p.qubits == inst.qubits)
            });

            if let Some(idx) = candidate {
                let prev_gate = output[idx].as_ref().and_then(|p| p.as_gate().copied());
                if let Some(outcome) = prev_gate.and_then(|p| combine(p, gate)) {
                    changed = true;
                    match outcome {
                        Some(merged) => {
                            output[idx] = Some(Instruction::gate(merged, inst.qubits.clone()));
                        }
                        None => {
                            output[idx] = None;
                            for q in &inst.qubits {
                                stacks[q.index()].pop();
                            }
                        }
                    }
                    continue;
                }
            }
        }

        let idx = output.len();
        output.push(Some(inst.clone()));
        for q in &inst.qubits {
            stacks[q.index()].push(idx);
        }
    }

    (output, changed)
}
