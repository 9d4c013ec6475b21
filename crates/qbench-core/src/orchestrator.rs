//! Sequencing policy for a benchmark run.
//!
//! The ground-truth backend runs first whenever it is selected; its
//! distribution becomes the baseline every later record is scored against.
//! Backends run one at a time, and a failing backend only ever produces an
//! error record for itself.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, instrument, warn};

use qbench_hal::{Backend, BackendConfig, BackendKind, BackendRegistry, HalError, JobId};
use qbench_ir::Circuit;

use crate::error::{RecordError, ResourceLimitError, RunError};
use crate::fidelity;
use crate::normalizer::{CompileStats, MeasurementMap, RawRun, RunMetrics, normalize};
use crate::record::{BenchmarkRecord, Distribution};

/// Name of the default ground-truth backend.
pub const DEFAULT_GROUND_TRUTH: &str = "statevector";

/// Settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Backend whose distribution is the baseline.
    pub ground_truth: String,
    /// Shots requested from sampling backends.
    pub shots: u32,
    /// Bounded wait for hardware jobs.
    pub hardware_timeout: Duration,
    /// Status poll interval for hardware jobs.
    pub poll_interval: Duration,
    /// Per-backend qubit ceilings. Backends not listed use their advertised
    /// qubit count.
    pub qubit_ceilings: BTreeMap<String, u32>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ground_truth: DEFAULT_GROUND_TRUTH.to_string(),
            shots: 1024,
            hardware_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(1000),
            qubit_ceilings: BTreeMap::new(),
        }
    }
}

/// Progress callbacks, invoked in execution order.
pub trait RunObserver {
    fn backend_started(&mut self, _name: &str, _position: usize, _total: usize) {}
    fn backend_finished(&mut self, _record: &BenchmarkRecord) {}
}

impl RunObserver for () {}

/// Runs one circuit across the selected backends.
pub struct Orchestrator {
    registry: BackendRegistry,
    options: RunOptions,
    configs: FxHashMap<String, BackendConfig>,
}

impl Orchestrator {
    pub fn new(registry: BackendRegistry, options: RunOptions) -> Self {
        Self {
            registry,
            options,
            configs: FxHashMap::default(),
        }
    }

    /// Use `config` when creating backend `name`.
    #[must_use]
    pub fn with_backend_config(mut self, name: impl Into<String>, config: BackendConfig) -> Self {
        self.configs.insert(name.into(), config);
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Execution order: ground truth first when selected, then the others in
    /// selection order, without duplicates.
    pub fn plan<S: AsRef<str>>(&self, selected: &[S]) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut order: Vec<String> = selected
            .iter()
            .map(|s| s.as_ref())
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect();

        if let Some(pos) = order.iter().position(|n| *n == self.options.ground_truth) {
            let ground_truth = order.remove(pos);
            order.insert(0, ground_truth);
        }
        order
    }

    /// Run `circuit` on every selected backend.
    pub async fn run<S: AsRef<str>>(
        &self,
        circuit: &Circuit,
        selected: &[S],
    ) -> Result<Vec<BenchmarkRecord>, RunError> {
        self.run_observed(circuit, selected, &mut ()).await
    }

    /// Run `circuit` on every selected backend, reporting progress.
    #[instrument(skip_all, fields(circuit = circuit.name()))]
    pub async fn run_observed<S: AsRef<str>>(
        &self,
        circuit: &Circuit,
        selected: &[S],
        observer: &mut (dyn RunObserver + Send),
    ) -> Result<Vec<BenchmarkRecord>, RunError> {
        let plan = self.plan(selected);
        if plan.is_empty() {
            return Err(RunError::NoBackendSelected);
        }
        if circuit.num_qubits() == 0 || circuit.num_ops() == 0 {
            return Err(RunError::EmptyCircuit);
        }

        info!(
            "Benchmarking {} qubits, {} ops on {} backend(s)",
            circuit.num_qubits(),
            circuit.num_ops(),
            plan.len()
        );

        let measurements = MeasurementMap::of(circuit);
        let mut baseline: Option<Distribution> = None;
        let mut records = Vec::with_capacity(plan.len());

        for (position, name) in plan.iter().enumerate() {
            observer.backend_started(name, position, plan.len());

            let record = self.run_backend(name, circuit, &measurements).await;
            let record = if *name == self.options.ground_truth {
                if let Some(dist) = record.distribution() {
                    baseline = Some(dist.clone());
                    record.with_fidelity(Some(1.0))
                } else {
                    record
                }
            } else {
                let score = fidelity::compare(baseline.as_ref(), record.distribution());
                record.with_fidelity(score)
            };

            match record.error() {
                Some(error) => warn!("{} failed: {}", name, error),
                None => info!(
                    "{} finished in {:.3}s, fidelity {:?}",
                    name, record.total_latency, record.fidelity
                ),
            }
            observer.backend_finished(&record);
            records.push(record);
        }

        Ok(records)
    }

    fn backend_config(&self, name: &str) -> BackendConfig {
        let mut config = self
            .configs
            .get(name)
            .cloned()
            .unwrap_or_else(|| BackendConfig::new(name));
        if config.name.is_empty() {
            config.name = name.to_string();
        }
        config
    }

    /// One backend call, bracketed by its own timers.
    #[instrument(skip(self, circuit, measurements))]
    async fn run_backend(
        &self,
        name: &str,
        circuit: &Circuit,
        measurements: &MeasurementMap,
    ) -> BenchmarkRecord {
        let started = Instant::now();
        let mut metrics = RunMetrics {
            compile: CompileStats::unchanged(circuit.gate_count() as u64),
            ..RunMetrics::default()
        };

        let backend = match self.registry.create(name, self.backend_config(name)) {
            Ok(backend) => backend,
            Err(e) => {
                metrics.total_latency = started.elapsed().as_secs_f64();
                return normalize(
                    name,
                    BackendKind::Simulator,
                    &metrics,
                    None,
                    Err(e.into()),
                );
            }
        };
        let kind = backend.capabilities().kind();

        let raw = self
            .execute(name, backend.as_ref(), circuit, &mut metrics)
            .await;
        metrics.total_latency = started.elapsed().as_secs_f64();
        normalize(name, kind, &metrics, Some(measurements), raw)
    }

    async fn execute(
        &self,
        name: &str,
        backend: &dyn Backend,
        circuit: &Circuit,
        metrics: &mut RunMetrics,
    ) -> Result<RawRun, RecordError> {
        let ceiling = self
            .options
            .qubit_ceilings
            .get(name)
            .copied()
            .unwrap_or(backend.capabilities().num_qubits);
        if circuit.num_qubits() > ceiling as usize {
            return Err(ResourceLimitError {
                backend: name.to_string(),
                required: circuit.num_qubits(),
                ceiling,
            }
            .into());
        }

        let compile_start = Instant::now();
        let transpiled = backend.transpile(circuit)?;
        metrics.compilation_time = compile_start.elapsed().as_secs_f64();
        metrics.compile = CompileStats {
            pre_gate_count: circuit.gate_count() as u64,
            post_gate_count: transpiled.circuit.gate_count() as u64,
            compiled: transpiled.compiled,
            swaps_inserted: transpiled.swaps_inserted,
        };
        debug!(
            "{} compiled {} -> {} gates",
            name, metrics.compile.pre_gate_count, metrics.compile.post_gate_count
        );

        backend.validate(&transpiled.circuit).await?.into_result()?;

        let exec_start = Instant::now();
        let job_id = backend.submit(&transpiled.circuit, self.options.shots).await?;
        let waited = match backend.capabilities().kind() {
            BackendKind::Hardware => {
                backend
                    .wait_for(
                        &job_id,
                        self.options.hardware_timeout,
                        self.options.poll_interval,
                    )
                    .await
            }
            BackendKind::Simulator => backend.wait(&job_id).await,
        };
        metrics.execution_time = exec_start.elapsed().as_secs_f64();

        match waited {
            Ok(result) => {
                metrics.memory_bytes = result.memory_bytes.unwrap_or(0);
                Ok(RawRun::Completed(result.outcome))
            }
            Err(HalError::Timeout(id)) => {
                info!("{} job {} still queued after bounded wait", name, id);
                Ok(RawRun::Queued(JobId::new(id)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
