//! Quantinuum backend implementation.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use qbench_compile::{BasisGates, PassManagerBuilder};
use qbench_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, Transpiled, ValidationResult,
};
use qbench_ir::Circuit;

use crate::api::{JobOptions, JobRequest, QuantinuumClient};
use crate::error::{QuantinuumError, QuantinuumResult};

/// Default target machine: the noiseless H2 emulator.
pub const DEFAULT_MACHINE: &str = "H2-1LE";

/// H2 machines expose 32 qubits.
const DEFAULT_NUM_QUBITS: u32 = 32;

/// Maximum number of cached jobs before evicting finished entries.
const MAX_CACHED_JOBS: usize = 1_000;

struct CachedJob {
    job: Job,
    /// Classical register names in declaration order, for bitstring assembly.
    cregs: Vec<String>,
    result: Option<ExecutionResult>,
}

/// Quantinuum ion-trap machine or hosted emulator.
///
/// All machines have all-to-all connectivity, so compilation only
/// translates to `rx`, `ry`, `rz` and `cx` and cancels redundant gates.
///
/// # Configuration
///
/// | Key | Source | Default |
/// |-----|--------|---------|
/// | `endpoint` | config | `https://qapi.quantinuum.com/v1` |
/// | `machine` | config extra | `H2-1LE` |
/// | `num_qubits` | config extra | 32 |
/// | `email` | config extra, then `QUANTINUUM_EMAIL` | required |
/// | `token` (password) | config, then `QUANTINUUM_PASSWORD` | required |
pub struct QuantinuumBackend {
    name: String,
    client: QuantinuumClient,
    machine: String,
    capabilities: Capabilities,
    jobs: Mutex<FxHashMap<String, CachedJob>>,
}

impl QuantinuumBackend {
    /// Target the default emulator with credentials from the environment.
    pub fn new() -> QuantinuumResult<Self> {
        Self::from_settings(&BackendConfig::new("quantinuum"))
    }

    /// Target a machine with explicit credentials.
    pub fn with_credentials(
        machine: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> QuantinuumResult<Self> {
        let client = QuantinuumClient::new(email, password)?;
        Ok(Self::with_client("quantinuum", client, machine, DEFAULT_NUM_QUBITS))
    }

    fn with_client(
        name: impl Into<String>,
        client: QuantinuumClient,
        machine: impl Into<String>,
        num_qubits: u32,
    ) -> Self {
        let machine = machine.into();
        Self {
            name: name.into(),
            capabilities: Capabilities::quantinuum(machine.clone(), num_qubits),
            client,
            machine,
            jobs: Mutex::new(FxHashMap::default()),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_settings(config: &BackendConfig) -> QuantinuumResult<Self> {
        let email = match config.extra_str("email") {
            Some(email) => email.to_string(),
            None => std::env::var("QUANTINUUM_EMAIL").map_err(|_| QuantinuumError::MissingEmail)?,
        };
        let password = match &config.token {
            Some(password) => password.clone(),
            None => std::env::var("QUANTINUUM_PASSWORD")
                .map_err(|_| QuantinuumError::MissingPassword)?,
        };
        let endpoint = config.endpoint.as_deref().unwrap_or(crate::api::BASE_URL);
        let machine = config.extra_str("machine").unwrap_or(DEFAULT_MACHINE);
        let num_qubits = config
            .extra_u64("num_qubits")
            .map_or(DEFAULT_NUM_QUBITS, |n| n.min(u64::from(u32::MAX)) as u32);
        let name = if config.name.is_empty() {
            "quantinuum"
        } else {
            config.name.as_str()
        };

        let client = QuantinuumClient::with_base_url(endpoint, email, password)?;
        Ok(Self::with_client(name, client, machine, num_qubits))
    }

    /// Target machine name.
    pub fn machine(&self) -> &str {
        &self.machine
    }

    fn map_job_error(job_id: &JobId, e: QuantinuumError) -> HalError {
        match e {
            QuantinuumError::JobNotFound(_) => HalError::JobNotFound(job_id.0.clone()),
            other => other.into(),
        }
    }
}

/// Assemble per-register shot bitstrings into counts.
///
/// Registers are concatenated with the last declared register leftmost, so
/// the overall bitstring has the highest classical bit first. Registers not
/// named in `cregs` follow in name order.
pub(crate) fn parse_results(
    results: &HashMap<String, Vec<String>>,
    cregs: &[String],
) -> QuantinuumResult<Counts> {
    let mut order: Vec<&str> = cregs
        .iter()
        .map(String::as_str)
        .filter(|name| results.contains_key(*name))
        .collect();
    let mut extra: Vec<&str> = results
        .keys()
        .map(String::as_str)
        .filter(|name| !order.contains(name))
        .collect();
    extra.sort_unstable();
    order.extend(extra);

    let Some(shots) = order.first().map(|name| results[*name].len()) else {
        return Ok(Counts::new());
    };
    if let Some(name) = order.iter().find(|name| results[**name].len() != shots) {
        return Err(QuantinuumError::MalformedResults(format!(
            "register {name} has {} shots, expected {shots}",
            results[*name].len()
        )));
    }

    let mut counts = Counts::new();
    for shot in 0..shots {
        let bitstring: String = order
            .iter()
            .rev()
            .map(|name| results[*name][shot].as_str())
            .collect();
        counts.insert(bitstring, 1);
    }
    Ok(counts)
}

#[async_trait]
impl Backend for QuantinuumBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[instrument(skip(self))]
    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.client.get_machine(&self.machine).await {
            Ok(info) if info.is_online() => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.queue_length,
                status_message: None,
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(
                info.status.unwrap_or_else(|| "offline".into()),
            )),
            Err(e) => {
                debug!("Quantinuum availability check failed: {}", e);
                Ok(BackendAvailability::unavailable(e.to_string()))
            }
        }
    }

    fn transpile(&self, circuit: &Circuit) -> HalResult<Transpiled> {
        let mut compiled = circuit.clone();
        if !compiled.has_measurements() {
            compiled
                .measure_all()
                .map_err(|e| HalError::Compilation(e.to_string()))?;
        }

        let (pm, mut props) = PassManagerBuilder::new()
            .with_basis(BasisGates::quantinuum())
            .build();
        pm.run(&mut compiled, &mut props)
            .map_err(|e| HalError::Compilation(e.to_string()))?;
        Ok(Transpiled::compiled(compiled))
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::check(circuit, &self.capabilities))
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        info!(
            "Submitting circuit to Quantinuum {}: {} qubits, {} shots",
            self.machine,
            circuit.num_qubits(),
            shots
        );

        ValidationResult::check(circuit, &self.capabilities).into_result()?;
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "Requested {shots} shots, allowed 1 to {}",
                self.capabilities.max_shots
            )));
        }
        if !circuit.has_measurements() {
            return Err(HalError::InvalidCircuit(
                "circuit has no measurements to report".into(),
            ));
        }

        let program = qbench_qasm::emit_qasm2(circuit);
        debug!("Generated QASM 2.0 ({} chars)", program.len());

        let req = JobRequest::new(&self.machine, program, shots)
            .with_options(JobOptions { no_opt: Some(true) });
        let response = self.client.submit_job(&req).await?;

        let job_id = JobId::new(response.job);
        info!("Job submitted: {}", job_id);

        let mut jobs = self.jobs.lock().await;
        if jobs.len() >= MAX_CACHED_JOBS {
            jobs.retain(|_, cached| !cached.job.status.is_terminal());
        }
        jobs.insert(
            job_id.0.clone(),
            CachedJob {
                job: Job::new(job_id.clone(), shots).with_backend(&self.name),
                cregs: circuit.cregs().iter().map(|r| r.name.clone()).collect(),
                result: None,
            },
        );

        Ok(job_id)
    }

    #[instrument(skip(self))]
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let response = self
            .client
            .get_job(&job_id.0)
            .await
            .map_err(|e| Self::map_job_error(job_id, e))?;

        let status = if response.is_completed() {
            JobStatus::Completed
        } else if response.is_failed() {
            JobStatus::Failed(response.error.unwrap_or_default())
        } else if response.is_cancelled() {
            JobStatus::Cancelled
        } else if response.is_running() {
            JobStatus::Running
        } else {
            JobStatus::Queued
        };

        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.job = cached.job.clone().with_status(status.clone());
        }
        Ok(status)
    }

    #[instrument(skip(self))]
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let cregs = {
            let jobs = self.jobs.lock().await;
            match jobs.get(&job_id.0) {
                Some(CachedJob {
                    result: Some(result),
                    ..
                }) => return Ok(result.clone()),
                Some(cached) => cached.cregs.clone(),
                None => Vec::new(),
            }
        };

        let response = self
            .client
            .get_job(&job_id.0)
            .await
            .map_err(|e| Self::map_job_error(job_id, e))?;

        if response.is_failed() {
            return Err(HalError::JobFailed(response.error.unwrap_or_default()));
        }
        if response.is_cancelled() {
            return Err(HalError::JobCancelled);
        }
        if !response.is_completed() {
            return Err(HalError::Backend(format!(
                "Job {} is not yet completed (status: {})",
                job_id, response.status
            )));
        }

        let results = response.results.ok_or_else(|| {
            HalError::JobFailed("Completed job returned no measurement results".into())
        })?;
        let counts = parse_results(&results, &cregs)?;
        let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);
        let result = ExecutionResult::counts(counts, shots);

        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.result = Some(result.clone());
            cached.job = cached.job.clone().with_status(JobStatus::Completed);
        }
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client
            .cancel_job(&job_id.0)
            .await
            .map_err(|e| Self::map_job_error(job_id, e))?;

        if let Some(cached) = self.jobs.lock().await.get_mut(&job_id.0) {
            cached.job = cached.job.clone().with_status(JobStatus::Cancelled);
        }
        info!("Job cancelled: {}", job_id);
        Ok(())
    }
}

impl BackendFactory for QuantinuumBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        Ok(Self::from_settings(&config)?)
    }
}
