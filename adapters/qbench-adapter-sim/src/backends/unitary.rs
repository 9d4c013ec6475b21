//! Unitary-matrix backend.

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument};

use qbench_compile::{BasisGates, PassManagerBuilder};
use qbench_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    GateSet, HalError, HalResult, JobId, JobStatus, Transpiled, ValidationResult,
};
use qbench_ir::Circuit;

use super::{SimSettings, check_size, compile, has_mid_circuit_operations};
use crate::engine::Unitary;
use crate::jobs::JobTable;

/// Default qubit limit: a 12-qubit unitary takes 256 MiB.
const DEFAULT_MAX_QUBITS: u32 = 12;

/// Simulator that builds the full circuit unitary and applies it to |0...0⟩.
///
/// Circuits are first translated to `rx`, `ry`, `rz` and `cx`, so the
/// outcome also checks that translation preserves semantics.
pub struct UnitaryBackend {
    settings: SimSettings,
    capabilities: Capabilities,
    jobs: JobTable,
}

impl UnitaryBackend {
    /// Create a unitary backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a unitary backend with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::with_settings(SimSettings::from_config(
            &BackendConfig::default(),
            "unitary",
            max_qubits,
        ))
    }

    fn with_settings(settings: SimSettings) -> Self {
        let capabilities = Capabilities::simulator(settings.name.clone(), settings.max_qubits)
            .with_gate_set(GateSet::rotations())
            .with_feature("statevector")
            .with_feature("unitary");
        Self {
            settings,
            capabilities,
            jobs: JobTable::default(),
        }
    }

    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        if has_mid_circuit_operations(circuit) {
            return Err(HalError::Unsupported(
                "unitary simulation of mid-circuit measurement or reset".into(),
            ));
        }
        let circuit = circuit.without_final_measurements();

        debug!(
            "Building {}x{} unitary",
            1usize << circuit.num_qubits(),
            1usize << circuit.num_qubits()
        );
        let unitary = Unitary::from_circuit(&circuit);
        let state = unitary.apply_to_zero_state();
        let memory = unitary.memory_bytes() + (std::mem::size_of_val(state.as_slice()) as u64);

        let elapsed = start.elapsed();
        debug!("Unitary simulation completed in {:?}", elapsed);

        Ok(ExecutionResult::statevector(state)
            .with_execution_time_ms(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .with_memory_bytes(memory))
    }
}

impl Default for UnitaryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for UnitaryBackend {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    fn transpile(&self, circuit: &Circuit) -> HalResult<Transpiled> {
        let builder = PassManagerBuilder::new()
            .with_optimization_level(self.settings.optimization_level)
            .with_basis(BasisGates::rotations());
        let (compiled, _) = compile(circuit, builder)?;
        Ok(Transpiled::compiled(compiled))
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::check(circuit, &self.capabilities))
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        check_size(self.name(), circuit, self.settings.max_qubits)?;
        let result = self.run_simulation(circuit)?;
        let job_id = self.jobs.complete(self.name(), shots, result);
        debug!("Submitted job: {}", job_id);
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.jobs.status(job_id)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.jobs.result(job_id)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.jobs.cancel(job_id)
    }
}

impl BackendFactory for UnitaryBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        Ok(Self::with_settings(SimSettings::from_config(
            &config,
            "unitary",
            DEFAULT_MAX_QUBITS,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_hal::RawOutcome;
    use qbench_ir::QubitId;

    #[tokio::test]
    async fn test_transpile_to_rotations() {
        let backend = UnitaryBackend::new();
        let transpiled = backend.transpile(&Circuit::bell().unwrap()).unwrap();
        assert!(transpiled.compiled);
        assert!(backend.validate(&transpiled.circuit).await.unwrap().is_valid());
        // The untranslated circuit uses `h`, which the backend does not accept.
        assert!(!backend.validate(&Circuit::bell().unwrap()).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_bell_probabilities() {
        let backend = UnitaryBackend::new();
        let transpiled = backend.transpile(&Circuit::bell().unwrap()).unwrap();
        let job_id = backend.submit(&transpiled.circuit, 0).await.unwrap();
        let result = backend.wait(&job_id).await.unwrap();

        let RawOutcome::Statevector(amps) = result.outcome else {
            panic!("expected statevector");
        };
        assert!((amps[0].norm_sqr() - 0.5).abs() < 1e-10);
        assert!((amps[3].norm_sqr() - 0.5).abs() < 1e-10);
        // 4x4 matrix plus a 4-element state.
        assert_eq!(result.memory_bytes, Some(16 * 16 + 4 * 16));
    }

    #[tokio::test]
    async fn test_default_limit() {
        let backend = UnitaryBackend::new();
        assert_eq!(backend.capabilities().num_qubits, 12);
        let circuit = Circuit::with_size("big", 13, 0);
        assert!(matches!(
            backend.submit(&circuit, 0).await,
            Err(HalError::CircuitTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_x_circuit() {
        let backend = UnitaryBackend::new();
        let mut circuit = Circuit::with_size("x", 1, 0);
        circuit.x(QubitId(0)).unwrap();
        let transpiled = backend.transpile(&circuit).unwrap();
        let job_id = backend.submit(&transpiled.circuit, 0).await.unwrap();
        let RawOutcome::Statevector(amps) = backend.result(&job_id).await.unwrap().outcome else {
            panic!("expected statevector");
        };
        assert!((amps[1].norm_sqr() - 1.0).abs() < 1e-10);
    }
}
