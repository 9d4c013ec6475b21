//! Simulator backends.

mod sampler;
mod statevector;
mod unitary;

pub use sampler::SamplerBackend;
pub use statevector::StatevectorBackend;
pub use unitary::UnitaryBackend;

use qbench_compile::{PassManagerBuilder, PropertySet};
use qbench_hal::{BackendConfig, HalError, HalResult};
use qbench_ir::Circuit;

/// Run a compilation pipeline on a copy of `circuit`.
fn compile(circuit: &Circuit, builder: PassManagerBuilder) -> HalResult<(Circuit, PropertySet)> {
    let (pm, mut props) = builder.build();
    let mut compiled = circuit.clone();
    pm.run(&mut compiled, &mut props)
        .map_err(|e| HalError::Compilation(e.to_string()))?;
    Ok((compiled, props))
}

/// Reject circuits wider than the simulator allows.
fn check_size(name: &str, circuit: &Circuit, max_qubits: u32) -> HalResult<()> {
    if circuit.num_qubits() > max_qubits as usize {
        return Err(HalError::CircuitTooLarge(format!(
            "Circuit has {} qubits but {} only supports {}",
            circuit.num_qubits(),
            name,
            max_qubits
        )));
    }
    Ok(())
}

/// Whether measurements or resets remain once terminal measurements are
/// stripped. Exact state simulation cannot represent them.
fn has_mid_circuit_operations(circuit: &Circuit) -> bool {
    circuit
        .without_final_measurements()
        .instructions()
        .iter()
        .any(|inst| inst.is_measure() || inst.is_reset())
}

/// Settings common to all simulators, read from a backend config.
struct SimSettings {
    name: String,
    max_qubits: u32,
    optimization_level: u8,
}

impl SimSettings {
    #[allow(clippy::cast_possible_truncation)]
    fn from_config(config: &BackendConfig, default_name: &str, default_max_qubits: u32) -> Self {
        let name = if config.name.is_empty() {
            default_name.to_string()
        } else {
            config.name.clone()
        };
        Self {
            name,
            max_qubits: config
                .extra_u64("max_qubits")
                .map_or(default_max_qubits, |v| v.min(u64::from(u32::MAX)) as u32),
            optimization_level: config
                .extra_u64("optimization_level")
                .map_or(1, |v| v.min(1) as u8),
        }
    }
}
