//! Exact statevector backend, the usual ground truth.

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument};

use qbench_compile::PassManagerBuilder;
use qbench_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    HalError, HalResult, JobId, JobStatus, Transpiled, ValidationResult,
};
use qbench_ir::Circuit;

use super::{SimSettings, check_size, compile, has_mid_circuit_operations};
use crate::engine::Statevector;
use crate::jobs::JobTable;

/// Default qubit limit: 2^24 amplitudes take 256 MiB.
const DEFAULT_MAX_QUBITS: u32 = 24;

/// Statevector simulator returning final amplitudes.
///
/// Terminal measurements are dropped; the outcome is the exact state before
/// them. Compilation is limited to gate cancellation.
pub struct StatevectorBackend {
    settings: SimSettings,
    capabilities: Capabilities,
    jobs: JobTable,
}

impl StatevectorBackend {
    /// Create a statevector backend with default settings.
    pub fn new() -> Self {
        Self::with_settings(SimSettings::from_config(
            &BackendConfig::default(),
            "statevector",
            DEFAULT_MAX_QUBITS,
        ))
    }

    /// Create a statevector backend with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::with_settings(SimSettings::from_config(
            &BackendConfig::default(),
            "statevector",
            max_qubits,
        ))
    }

    fn with_settings(settings: SimSettings) -> Self {
        let capabilities = Capabilities::simulator(settings.name.clone(), settings.max_qubits)
            .with_feature("statevector");
        Self {
            settings,
            capabilities,
            jobs: JobTable::default(),
        }
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit) -> HalResult<ExecutionResult> {
        let start = Instant::now();
        if has_mid_circuit_operations(circuit) {
            return Err(HalError::Unsupported(
                "statevector simulation of mid-circuit measurement or reset".into(),
            ));
        }
        let circuit = circuit.without_final_measurements();

        debug!(
            "Starting statevector simulation: {} qubits, {} instructions",
            circuit.num_qubits(),
            circuit.instructions().len()
        );

        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst);
        }
        let memory = sv.memory_bytes();

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        Ok(ExecutionResult::statevector(sv.into_amplitudes())
            .with_execution_time_ms(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .with_memory_bytes(memory))
    }
}

impl Default for StatevectorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for StatevectorBackend {
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
        let builder =
            PassManagerBuilder::new().with_optimization_level(self.settings.optimization_level);
        let (compiled, _) = compile(circuit, builder)?;
        Ok(Transpiled::compiled(compiled))
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let result = ValidationResult::check(circuit, &self.capabilities);
        if has_mid_circuit_operations(circuit) {
            let mut reasons = match result {
                ValidationResult::Invalid { reasons } => reasons,
                ValidationResult::Valid => vec![],
            };
            reasons.push("Mid-circuit measurement or reset is not supported".into());
            return Ok(ValidationResult::Invalid { reasons });
        }
        Ok(result)
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

impl BackendFactory for StatevectorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        Ok(Self::with_settings(SimSettings::from_config(
            &config,
            "statevector",
            DEFAULT_MAX_QUBITS,
        )))
    }
}
