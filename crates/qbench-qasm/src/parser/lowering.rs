//! AST-to-Circuit lowering for QASM 2.0.
//!
//! Statements are lowered in program order, which matches the language rule
//! that registers and gates are declared before use. Whole-register arguments
//! broadcast element-wise, and user gate definitions are inlined.

use qbench_ir::{Circuit, ClbitId, Instruction, QubitId, StandardGate};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{Argument, GateCall, GateDef, Program, Statement};
use crate::error::{ParseError, ParseResult};

/// Maximum nesting depth when inlining user gate definitions.
const MAX_GATE_NESTING: usize = 64;

/// Lower an AST Program to a Circuit.
pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::new();
    lowerer.lower(program)
}

/// Lowers AST to Circuit.
struct Lowerer {
    /// Qubit registers: name -> (`offset`, size).
    qregs: FxHashMap<String, (u32, u32)>,
    /// Classical registers: name -> (`offset`, size).
    cregs: FxHashMap<String, (u32, u32)>,
    /// User gate definitions.
    gates: FxHashMap<String, GateDef>,
    /// Names declared `opaque`.
    opaque: FxHashSet<String>,
}

impl Lowerer {
    fn new() -> Self {
        Self {
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            gates: FxHashMap::default(),
            opaque: FxHashSet::default(),
        }
    }

    fn lower(&mut self, program: &Program) -> ParseResult<Circuit> {
        let mut circuit = Circuit::new("qasm_circuit");
        for stmt in &program.statements {
            self.lower_statement(&mut circuit, stmt)?;
        }
        Ok(circuit)
    }

    fn lower_statement(&mut self, circuit: &mut Circuit, stmt: &Statement) -> ParseResult<()> {
        match stmt {
            Statement::Include(path) => {
                // Standard gates are built in, so the standard header needs no loading.
                if path == "qelib1.inc" {
                    Ok(())
                } else {
                    Err(ParseError::Unsupported(format!("include \"{path}\"")))
                }
            }

            Statement::QReg { name, size } => {
                if self.qregs.contains_key(name) || self.cregs.contains_key(name) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                let offset = circuit.num_qubits() as u32;
                if offset.checked_add(*size).is_none() {
                    return Err(ParseError::Unsupported(format!("register '{name}' is too large")));
                }
                circuit.add_qreg(name.clone(), *size);
                self.qregs.insert(name.clone(), (offset, *size));
                Ok(())
            }

            Statement::CReg { name, size } => {
                if self.qregs.contains_key(name) || self.cregs.contains_key(name) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                let offset = circuit.num_clbits() as u32;
                if offset.checked_add(*size).is_none() {
                    return Err(ParseError::Unsupported(format!("register '{name}' is too large")));
                }
                circuit.add_creg(name.clone(), *size);
                self.cregs.insert(name.clone(), (offset, *size));
                Ok(())
            }

            Statement::GateDef(def) => {
                if self.gates.contains_key(&def.name) || self.opaque.contains(&def.name) {
                    return Err(ParseError::DuplicateDeclaration(def.name.clone()));
                }
                self.gates.insert(def.name.clone(), def.clone());
                Ok(())
            }

            Statement::Opaque { name } => {
                self.opaque.insert(name.clone());
                Ok(())
            }

            Statement::Gate(call) => self.lower_gate_call(circuit, call),

            Statement::Measure { qubit, bit } => {
                let qubits = resolve(&self.qregs, qubit)?;
                let bits = resolve(&self.cregs, bit)?;
                if qubits.len() != bits.len() {
                    return Err(ParseError::RegisterSizeMismatch("measure".into()));
                }
                for (q, c) in qubits.into_iter().zip(bits) {
                    circuit.measure(QubitId(q), ClbitId(c))?;
                }
                Ok(())
            }

            Statement::Reset(arg) => {
                for q in resolve(&self.qregs, arg)? {
                    circuit.reset(QubitId(q))?;
                }
                Ok(())
            }

            Statement::Barrier(args) => {
                let mut qubits: Vec<QubitId> = Vec::new();
                for arg in args {
                    for q in resolve(&self.qregs, arg)? {
                        if !qubits.contains(&QubitId(q)) {
                            qubits.push(QubitId(q));
                        }
                    }
                }
                circuit.push(Instruction::barrier(qubits))?;
                Ok(())
            }

            Statement::If { register, .. } => Err(ParseError::Unsupported(format!(
                "classically controlled operation on '{register}'"
            ))),
        }
    }

    fn lower_gate_call(&self, circuit: &mut Circuit, call: &GateCall) -> ParseResult<()> {
        let empty = FxHashMap::default();
        let params = call
            .params
            .iter()
            .map(|p| p.evaluate(&empty))
            .collect::<ParseResult<Vec<_>>>()?;

        let resolved = call
            .args
            .iter()
            .map(|arg| resolve(&self.qregs, arg))
            .collect::<ParseResult<Vec<_>>>()?;

        for qubits in broadcast(&call.name, &call.args, &resolved)? {
            self.apply_gate(circuit, &call.name, &params, &qubits, 0)?;
        }
        Ok(())
    }

    /// Apply a built-in or user-defined gate to concrete qubits.
    fn apply_gate(
        &self,
        circuit: &mut Circuit,
        name: &str,
        params: &[f64],
        qubits: &[QubitId],
        depth: usize,
    ) -> ParseResult<()> {
        if depth > MAX_GATE_NESTING {
            return Err(ParseError::Unsupported(format!(
                "gate '{name}' nests deeper than {MAX_GATE_NESTING} levels"
            )));
        }

        if let Some(def) = self.gates.get(name) {
            return self.inline_definition(circuit, def, params, qubits, depth);
        }

        if self.opaque.contains(name) {
            return Err(ParseError::Unsupported(format!("opaque gate '{name}'")));
        }

        let (num_qubits, num_params) =
            StandardGate::signature(name).ok_or_else(|| ParseError::UnknownGate(name.into()))?;
        check_counts(name, num_qubits as usize, num_params, qubits.len(), params.len())?;

        let gate = StandardGate::from_name(name, params)
            .ok_or_else(|| ParseError::UnknownGate(name.into()))?;
        circuit.gate(gate, qubits.iter().copied())?;
        Ok(())
    }

    fn inline_definition(
        &self,
        circuit: &mut Circuit,
        def: &GateDef,
        params: &[f64],
        qubits: &[QubitId],
        depth: usize,
    ) -> ParseResult<()> {
        check_counts(
            &def.name,
            def.qubits.len(),
            def.params.len(),
            qubits.len(),
            params.len(),
        )?;

        let env: FxHashMap<String, f64> = def
            .params
            .iter()
            .cloned()
            .zip(params.iter().copied())
            .collect();
        let wires: FxHashMap<&str, QubitId> = def
            .qubits
            .iter()
            .map(String::as_str)
            .zip(qubits.iter().copied())
            .collect();

        for call in &def.body {
            let inner_params = call
                .params
                .iter()
                .map(|p| p.evaluate(&env))
                .collect::<ParseResult<Vec<_>>>()?;
            let inner_qubits = call
                .args
                .iter()
                .map(|arg| {
                    if arg.index.is_some() {
                        return Err(ParseError::Unsupported(format!(
                            "indexed argument '{}' inside gate '{}'",
                            arg.register, def.name
                        )));
                    }
                    wires
                        .get(arg.register.as_str())
                        .copied()
                        .ok_or_else(|| ParseError::UndefinedIdentifier(arg.register.clone()))
                })
                .collect::<ParseResult<Vec<_>>>()?;
            self.apply_gate(circuit, &call.name, &inner_params, &inner_qubits, depth + 1)?;
        }
        Ok(())
    }
}

fn check_counts(
    gate: &str,
    expected_qubits: usize,
    expected_params: usize,
    got_qubits: usize,
    got_params: usize,
) -> ParseResult<()> {
    if got_params != expected_params {
        return Err(ParseError::WrongParameterCount {
            gate: gate.into(),
            expected: expected_params,
            got: got_params,
        });
    }
    if got_qubits != expected_qubits {
        return Err(ParseError::WrongQubitCount {
            gate: gate.into(),
            expected: expected_qubits,
            got: got_qubits,
        });
    }
    Ok(())
}

/// Resolve an argument to flattened indices: one for `r[i]`, all for `r`.
fn resolve(registers: &FxHashMap<String, (u32, u32)>, arg: &Argument) -> ParseResult<Vec<u32>> {
    let &(offset, size) = registers
        .get(&arg.register)
        .ok_or_else(|| ParseError::UndefinedIdentifier(arg.register.clone()))?;

    match arg.index {
        Some(index) if index >= size => Err(ParseError::IndexOutOfBounds {
            register: arg.register.clone(),
            index: index as usize,
            size: size as usize,
        }),
        Some(index) => Ok(vec![offset + index]),
        None => Ok((offset..offset + size).collect()),
    }
}

/// Expand whole-register arguments into one qubit tuple per element.
fn broadcast(
    gate: &str,
    args: &[Argument],
    resolved: &[Vec<u32>],
) -> ParseResult<Vec<Vec<QubitId>>> {
    let mut width: Option<usize> = None;
    for (arg, qubits) in args.iter().zip(resolved) {
        if arg.index.is_none() {
            match width {
                Some(w) if w != qubits.len() => {
                    return Err(ParseError::RegisterSizeMismatch(gate.into()));
                }
                _ => width = Some(qubits.len()),
            }
        }
    }

    let rows = width.unwrap_or(1);
    Ok((0..rows)
        .map(|row| {
            args.iter()
                .zip(resolved)
                .map(|(arg, qubits)| {
                    let idx = if arg.index.is_none() { row } else { 0 };
                    QubitId(qubits[idx])
                })
                .collect()
        })
        .collect())
}
