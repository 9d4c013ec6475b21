//! Shot-sampling backend on a linear device.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::{debug, instrument};

use qbench_compile::{BasisGates, CouplingMap, PassManagerBuilder};
use qbench_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, GateSet, HalError, HalResult, JobId, JobStatus, Topology, Transpiled,
    ValidationResult,
};
use qbench_ir::{Circuit, InstructionKind};

use super::{SimSettings, check_size, compile, has_mid_circuit_operations};
use crate::engine::Statevector;
use crate::jobs::JobTable;

/// Default qubit limit.
const DEFAULT_MAX_QUBITS: u32 = 20;

/// Simulator that returns shot counts, modelling a device with nearest-neighbour
/// connectivity.
///
/// Compilation maps the circuit onto a linear chain of qubits, inserting SWAPs
/// for distant pairs, and translates to `rx`, `ry`, `rz` and `cx`. A circuit
/// without measurements has every qubit measured.
///
/// When every measurement is terminal the state is simulated once and shots
/// are drawn from the final distribution; otherwise each shot is simulated
/// separately with collapse on measurement and reset.
pub struct SamplerBackend {
    settings: SimSettings,
    seed: Option<u64>,
    capabilities: Capabilities,
    jobs: JobTable,
}

impl SamplerBackend {
    /// Create a sampler with default settings and a random seed.
    pub fn new() -> Self {
        Self::with_settings(
            SimSettings::from_config(&BackendConfig::default(), "sampler", DEFAULT_MAX_QUBITS),
            None,
        )
    }

    /// Fix the random seed so repeated runs give identical counts.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn with_settings(settings: SimSettings, seed: Option<u64>) -> Self {
        let capabilities = Capabilities::simulator(settings.name.clone(), settings.max_qubits)
            .with_gate_set(GateSet::rotations())
            .with_topology(Topology::linear(settings.max_qubits))
            .with_feature("counts");
        Self {
            settings,
            seed,
            capabilities,
            jobs: JobTable::default(),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = Instant::now();
        let mut rng = self.rng();

        debug!(
            "Starting sampling: {} qubits, {} shots",
            circuit.num_qubits(),
            shots
        );

        let (counts, memory) = if has_mid_circuit_operations(circuit) {
            sample_per_shot(circuit, shots, &mut rng)
        } else {
            sample_terminal(circuit, shots, &mut rng)
        };

        let elapsed = start.elapsed();
        debug!("Sampling completed in {:?}", elapsed);

        ExecutionResult::counts(counts, shots)
            .with_execution_time_ms(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .with_memory_bytes(memory)
    }
}

impl Default for SamplerBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Classical register contents as a bitstring, highest clbit first.
fn bitstring(bits: &[bool]) -> String {
    bits.iter().rev().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Simulate once, then draw `shots` basis states from the final distribution.
fn sample_terminal(circuit: &Circuit, shots: u32, rng: &mut impl Rng) -> (Counts, u64) {
    let measures: Vec<(usize, usize)> = circuit
        .instructions()
        .iter()
        .filter(|inst| inst.is_measure())
        .flat_map(|inst| {
            inst.qubits
                .iter()
                .zip(&inst.clbits)
                .map(|(q, c)| (q.index(), c.index()))
        })
        .collect();

    let mut sv = Statevector::new(circuit.num_qubits());
    for inst in circuit.instructions() {
        sv.apply(inst);
    }

    let cumulative: Vec<f64> = sv
        .probabilities()
        .into_iter()
        .scan(0.0, |acc, p| {
            *acc += p;
            Some(*acc)
        })
        .collect();
    let memory = sv.memory_bytes() + (std::mem::size_of_val(cumulative.as_slice()) as u64);

    let mut by_index: FxHashMap<usize, u64> = FxHashMap::default();
    for _ in 0..shots {
        let r: f64 = rng.r#gen();
        let index = cumulative
            .partition_point(|&c| c <= r)
            .min(cumulative.len() - 1);
        *by_index.entry(index).or_insert(0) += 1;
    }

    let mut counts = Counts::new();
    for (index, n) in by_index {
        let mut bits = vec![false; circuit.num_clbits()];
        for &(qubit, clbit) in &measures {
            bits[clbit] = (index >> qubit) & 1 == 1;
        }
        counts.insert(bitstring(&bits), n);
    }
    (counts, memory)
}

/// Simulate every shot separately, collapsing on each measurement.
fn sample_per_shot(circuit: &Circuit, shots: u32, rng: &mut impl Rng) -> (Counts, u64) {
    let mut counts = Counts::new();
    let mut memory = 0;

    for shot in 0..shots {
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut bits = vec![false; circuit.num_clbits()];

        for inst in circuit.instructions() {
            match inst.kind {
                InstructionKind::Gate(_) => sv.apply(inst),
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        bits[c.index()] = sv.measure(q.index(), rng);
                    }
                }
                InstructionKind::Reset => {
                    for q in &inst.qubits {
                        sv.reset(q.index(), rng);
                    }
                }
                InstructionKind::Barrier => {}
            }
        }

        memory = sv.memory_bytes();
        counts.insert(bitstring(&bits), 1);

        if shot > 0 && shot % 1000 == 0 {
            debug!("Completed {} shots", shot);
        }
    }
    (counts, memory)
}

#[async_trait]
impl Backend for SamplerBackend {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn transpile(&self, circuit: &Circuit) -> HalResult<Transpiled> {
        let mut measured = circuit.clone();
        if !measured.has_measurements() {
            measured
                .measure_all()
                .map_err(|e| HalError::Compilation(e.to_string()))?;
        }

        let builder = PassManagerBuilder::new()
            .with_optimization_level(self.settings.optimization_level)
            .with_target(
                CouplingMap::linear(measured.num_qubits() as u32),
                BasisGates::rotations(),
            );
        let (compiled, props) = compile(&measured, builder)?;

        Ok(Transpiled {
            circuit: compiled,
            compiled: true,
            swaps_inserted: Some(props.swaps_inserted),
            layout: props.layout.map(|l| l.as_slice().to_vec()),
        })
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::check(circuit, &self.capabilities))
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        check_size(self.name(), circuit, self.settings.max_qubits)?;
        if shots == 0 {
            return Err(HalError::InvalidShots("sampler needs at least one shot".into()));
        }
        if shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{} exceeds the maximum of {}",
                shots, self.capabilities.max_shots
            )));
        }

        let result = if circuit.has_measurements() {
            self.run_simulation(circuit, shots)
        } else {
            let mut measured = circuit.clone();
            measured
                .measure_all()
                .map_err(|e| HalError::InvalidCircuit(e.to_string()))?;
            self.run_simulation(&measured, shots)
        };

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

impl BackendFactory for SamplerBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let seed = config.extra_u64("seed");
        Ok(Self::with_settings(
            SimSettings::from_config(&config, "sampler", DEFAULT_MAX_QUBITS),
            seed,
        ))
    }
}
