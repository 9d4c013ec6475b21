//! QASM 2.0 emitter for serializing circuits.

use qbench_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId, Register, StandardGate};

/// Emit a circuit as QASM 2.0 source code.
///
/// Produces output compatible with the Quantinuum REST API and other tools
/// that accept `OPENQASM 2.0` with `qelib1.inc`. Register names are preserved,
/// and gates are spelled with their `qelib1.inc` names (`u1`, `u3`, `cu1`).
pub fn emit_qasm2(circuit: &Circuit) -> String {
    let mut emitter = Qasm2Emitter::new(circuit);
    emitter.emit_circuit(circuit);
    emitter.output
}

struct Qasm2Emitter<'a> {
    output: String,
    qregs: &'a [Register],
    cregs: &'a [Register],
}

impl<'a> Qasm2Emitter<'a> {
    fn new(circuit: &'a Circuit) -> Self {
        Self {
            output: String::new(),
            qregs: circuit.qregs(),
            cregs: circuit.cregs(),
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        self.writeln("OPENQASM 2.0;");
        self.writeln("include \"qelib1.inc\";");

        for reg in circuit.qregs() {
            self.writeln(&format!("qreg {}[{}];", reg.name, reg.size));
        }
        for reg in circuit.cregs() {
            self.writeln(&format!("creg {}[{}];", reg.name, reg.size));
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction);
        }
    }

    fn emit_instruction(&mut self, instruction: &Instruction) {
        let qubits = instruction
            .qubits
            .iter()
            .map(|q| self.qubit_name(*q))
            .collect::<Vec<_>>()
            .join(", ");

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let params = gate
                    .parameters()
                    .iter()
                    .map(|p| format_param(*p))
                    .collect::<Vec<_>>()
                    .join(", ");
                let name = qelib_name(gate);
                if params.is_empty() {
                    self.writeln(&format!("{name} {qubits};"));
                } else {
                    self.writeln(&format!("{name}({params}) {qubits};"));
                }
            }
            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    let line = format!(
                        "measure {} -> {};",
                        self.qubit_name(*q),
                        self.clbit_name(*c)
                    );
                    self.writeln(&line);
                }
            }
            InstructionKind::Reset => self.writeln(&format!("reset {qubits};")),
            InstructionKind::Barrier => self.writeln(&format!("barrier {qubits};")),
        }
    }

    fn qubit_name(&self, qubit: QubitId) -> String {
        register_name(self.qregs, qubit.0, "q")
    }

    fn clbit_name(&self, clbit: ClbitId) -> String {
        register_name(self.cregs, clbit.0, "c")
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn register_name(registers: &[Register], index: u32, fallback: &str) -> String {
    registers
        .iter()
        .find(|r| r.contains(index))
        .map_or_else(
            || format!("{fallback}[{index}]"),
            |r| format!("{}[{}]", r.name, index - r.offset),
        )
}

fn qelib_name(gate: &StandardGate) -> &'static str {
    match gate {
        StandardGate::P(_) => "u1",
        StandardGate::CP(_) => "cu1",
        StandardGate::U(_, _, _) => "u3",
        other => other.name(),
    }
}

/// Shortest representation that parses back to the same `f64`.
fn format_param(value: f64) -> String {
    let text = format!("{value}");
    if text.contains(['.', 'e', 'N', 'i']) {
        text
    } else {
        format!("{text}.0")
    }
}
