//! Routing passes for inserting SWAP gates.

use qbench_ir::{Circuit, Instruction, QubitId, StandardGate};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Basic routing pass.
///
/// Rewrites every instruction onto physical qubits and inserts SWAP gates so
/// each two-qubit gate acts on coupled qubits. For a non-adjacent pair the
/// first operand is walked along the shortest path until it neighbours the
/// second. Greedy and far from optimal, but deterministic.
///
/// When the device has more qubits than the circuit, the extra physical
/// qubits are added as an `anc` register. The layout in the property set is
/// kept current so it describes where each logical qubit ends up.
pub struct BasicRouting;

impl Pass for BasicRouting {
    fn name(&self) -> &str {
        "BasicRouting"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        let layout = properties
            .layout
            .as_mut()
            .ok_or(CompileError::MissingLayout)?;

        let mut routed = circuit.clone_empty();
        let num_physical = coupling_map.num_qubits() as usize;
        if num_physical > routed.num_qubits() {
            let extra = (num_physical - routed.num_qubits()) as u32;
            routed.add_qreg("anc", extra);
        }

        let mut swaps = 0u32;
        for instruction in circuit.instructions() {
            if instruction.is_gate() && instruction.qubits.len() > 2 {
                return Err(CompileError::WideGate(instruction.name().to_string()));
            }

            if instruction.is_gate() && instruction.qubits.len() == 2 {
                let p0 = layout
                    .physical(instruction.qubits[0])
                    .ok_or(CompileError::MissingLayout)?;
                let p1 = layout
                    .physical(instruction.qubits[1])
                    .ok_or(CompileError::MissingLayout)?;

                if !coupling_map.is_connected(p0, p1) {
                    let path = coupling_map
                        .shortest_path(p0, p1)
                        .ok_or(CompileError::Unroutable { from: p0, to: p1 })?;
                    // Swap along the path, stopping one edge short of the target.
                    for pair in path[..path.len() - 1].windows(2) {
                        routed.push(Instruction::two_qubit_gate(
                            StandardGate::Swap,
                            QubitId(pair[0]),
                            QubitId(pair[1]),
                        ))?;
                        layout.swap(pair[0], pair[1]);
                        swaps += 1;
                    }
                }
            }

            let qubits = instruction
                .qubits
                .iter()
                .map(|&q| layout.physical(q).map(QubitId))
                .collect::<Option<Vec<_>>>()
                .ok_or(CompileError::MissingLayout)?;
            routed.push(Instruction {
                kind: instruction.kind.clone(),
                qubits,
                clbits: instruction.clbits.clone(),
            })?;
        }

        debug!("BasicRouting inserted {} swaps", swaps);
        properties.swaps_inserted += swaps;
        *circuit = routed;
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some() && properties.layout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{BasisGates, CouplingMap, Layout};
    use qbench_ir::ClbitId;

    fn props(map: CouplingMap, logical: u32) -> PropertySet {
        let physical = map.num_qubits();
        PropertySet {
            layout: Some(Layout::trivial(logical, physical)),
            ..PropertySet::new().with_target(map, BasisGates::rotations())
        }
    }

    #[test]
    fn test_adjacent_gate_needs_no_swap() {
        let mut circuit = Circuit::bell().unwrap();
        let mut props = props(CouplingMap::linear(2), 2);
        BasicRouting.run(&mut circuit, &mut props).unwrap();
        assert_eq!(props.swaps_inserted, 0);
        assert_eq!(circuit.gate_count(), 2);
    }

    #[test]
    fn test_distant_gate_inserts_swaps() {
        let mut circuit = Circuit::with_size("far", 4, 0);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        let mut props = props(CouplingMap::linear(4), 4);
        BasicRouting.run(&mut circuit, &mut props).unwrap();

        assert_eq!(props.swaps_inserted, 2);
        let last = circuit.instructions().last().unwrap();
        assert_eq!(last.qubits, vec![QubitId(2), QubitId(3)]);
        // Logical 0 has travelled to physical 2.
        assert_eq!(props.layout.as_ref().unwrap().as_slice(), &[2, 0, 1, 3]);
    }

    #[test]
    fn test_measurements_follow_layout() {
        let mut circuit = Circuit::with_size("m", 3, 3);
        circuit
            .cx(QubitId(0), QubitId(2))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();
        let mut props = props(CouplingMap::linear(3), 3);
        BasicRouting.run(&mut circuit, &mut props).unwrap();

        let measure = circuit.instructions().last().unwrap();
        assert_eq!(measure.qubits, vec![QubitId(1)]);
        assert_eq!(measure.clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_ancilla_register_added() {
        let mut circuit = Circuit::bell().unwrap();
        let mut props = props(CouplingMap::linear(5), 2);
        BasicRouting.run(&mut circuit, &mut props).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.qregs().last().unwrap().name, "anc");
    }

    #[test]
    fn test_wide_gate_rejected() {
        let mut circuit = Circuit::with_size("ccx", 3, 0);
        circuit
            .gate(StandardGate::CCX, [QubitId(0), QubitId(1), QubitId(2)])
            .unwrap();
        let mut props = props(CouplingMap::linear(3), 3);
        let err = BasicRouting.run(&mut circuit, &mut props).unwrap_err();
        assert!(matches!(err, CompileError::WideGate(name) if name == "ccx"));
    }

    #[test]
    fn test_unroutable() {
        let mut map = CouplingMap::new(2);
        map.rebuild_caches();
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let mut props = props(map, 2);
        let err = BasicRouting.run(&mut circuit, &mut props).unwrap_err();
        assert!(matches!(err, CompileError::Unroutable { from: 0, to: 1 }));
    }
}
