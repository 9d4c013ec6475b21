//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle for running a circuit on one
//! backend:
//!
//! ```text
//!   capabilities() --> transpile() --> validate() --> submit() --> status() --> result()
//!    (sync, &ref)       (sync)          (async)       (async)      (async)      (async)
//! ```
//!
//! ## Method table
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `transpile()` | sync | provided | `HalResult<Transpiled>` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |
//! | `wait_for()` | async | provided | `HalResult<ExecutionResult>` |

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use qbench_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    #[serde(default)]
    pub name: String,
    /// API endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token or password.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Additional configuration, e.g. `machine`, `max_qubits`, `seed`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an extra string value.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read an extra unsigned integer value.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// A circuit after backend-specific compilation.
#[derive(Debug, Clone)]
pub struct Transpiled {
    /// The circuit the backend will execute.
    pub circuit: Circuit,
    /// Whether any compilation pass ran. `false` means `circuit` is the input.
    pub compiled: bool,
    /// SWAP gates inserted by routing, if the backend routes.
    pub swaps_inserted: Option<u32>,
    /// Final physical qubit of each logical qubit, if the backend routes.
    pub layout: Option<Vec<u32>>,
}

impl Transpiled {
    /// The input circuit, untouched.
    pub fn unchanged(circuit: Circuit) -> Self {
        Self {
            circuit,
            compiled: false,
            swaps_inserted: None,
            layout: None,
        }
    }

    /// A compiled circuit without routing information.
    pub fn compiled(circuit: Circuit) -> Self {
        Self {
            circuit,
            compiled: true,
            swaps_inserted: None,
            layout: None,
        }
    }
}

/// Trait for benchmark backends.
///
/// Covers the full job lifecycle: introspection, compilation, validation,
/// submission, status polling, result retrieval and cancellation.
///
/// `capabilities()` is synchronous and infallible; implementations cache
/// capabilities at construction time. `result()` is only called once
/// `status()` reports `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Compile a circuit for this backend.
    ///
    /// The default returns the circuit unchanged.
    fn transpile(&self, circuit: &Circuit) -> HalResult<Transpiled> {
        Ok(Transpiled::unchanged(circuit.clone()))
    }

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution. The job starts `Queued`.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job with the default policy: poll every 500ms for up to
    /// 5 minutes.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.wait_for(job_id, Duration::from_secs(300), Duration::from_millis(500))
            .await
    }

    /// Poll a job until it finishes or `timeout` elapses.
    ///
    /// Expiry yields [`HalError::Timeout`] carrying the job id; the job itself
    /// is left running.
    async fn wait_for(
        &self,
        job_id: &JobId,
        timeout: Duration,
        poll_interval: Duration,
    ) -> HalResult<ExecutionResult> {
        // A timeout past the clock's range never expires.
        let deadline = tokio::time::Instant::now().checked_add(timeout);

        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    let remaining = match deadline {
                        Some(deadline) => {
                            let remaining =
                                deadline.saturating_duration_since(tokio::time::Instant::now());
                            if remaining.is_zero() {
                                return Err(HalError::Timeout(job_id.0.clone()));
                            }
                            remaining
                        }
                        None => Duration::MAX,
                    };
                    tokio::time::sleep(poll_interval.min(remaining)).await;
                }
            }
        }
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability of a local simulator: zero queue.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit is valid and can be submitted directly.
    Valid,
    /// Circuit is invalid for this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check a circuit's qubit count and gates against `capabilities`.
    pub fn check(circuit: &Circuit, capabilities: &Capabilities) -> Self {
        let mut reasons = vec![];

        if circuit.num_qubits() > capabilities.num_qubits as usize {
            reasons.push(format!(
                "Circuit has {} qubits but {} supports at most {}",
                circuit.num_qubits(),
                capabilities.name,
                capabilities.num_qubits
            ));
        }

        let mut unsupported: Vec<&str> = circuit
            .instructions()
            .iter()
            .filter_map(|inst| inst.as_gate())
            .map(|gate| gate.name())
            .filter(|name| !capabilities.gate_set.contains(name))
            .collect();
        unsupported.sort_unstable();
        unsupported.dedup();
        if !unsupported.is_empty() {
            reasons.push(format!("Unsupported gates: {}", unsupported.join(", ")));
        }

        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }

    /// Check if the circuit is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Turn an invalid result into [`HalError::InvalidCircuit`].
    pub fn into_result(self) -> HalResult<()> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid { reasons } => {
                Err(HalError::InvalidCircuit(reasons.join("; ")))
            }
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Counts, ExecutionResult};
    use qbench_ir::{Circuit, QubitId, StandardGate};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("quantinuum")
            .with_endpoint("https://qapi.quantinuum.com")
            .with_token("secret-token")
            .with_extra("machine", serde_json::json!("H1-1E"))
            .with_extra("max_qubits", serde_json::json!(20));

        assert_eq!(config.name, "quantinuum");
        assert_eq!(config.extra_str("machine"), Some("H1-1E"));
        assert_eq!(config.extra_u64("max_qubits"), Some(20));
        assert_eq!(config.extra_u64("machine"), None);
    }

    #[test]
    fn test_backend_config_debug_redacts_token() {
        let config = BackendConfig::new("q").with_token("hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_token_not_serialized() {
        let config = BackendConfig::new("q").with_token("hunter2");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_validation_check() {
        let caps = Capabilities::quantinuum("H1-1", 2);
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .gate(StandardGate::Rx(0.1), [QubitId(1)])
            .unwrap();

        match ValidationResult::check(&circuit, &caps) {
            ValidationResult::Invalid { reasons } => {
                assert_eq!(reasons.len(), 2);
                assert!(reasons[1].contains('h'));
            }
            ValidationResult::Valid => panic!("expected invalid"),
        }
        assert!(
            ValidationResult::check(&Circuit::with_size("e", 1, 0), &caps).is_valid()
        );
    }

    /// Reports `Queued` for `pending_polls` polls, then completes.
    struct SlowBackend {
        caps: Capabilities,
        pending_polls: u32,
        polls: AtomicU32,
    }

    #[async_trait]
    impl Backend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }
        fn capabilities(&self) -> &Capabilities {
            &self.caps
        }
        async fn availability(&self) -> HalResult<BackendAvailability> {
            Ok(BackendAvailability::always_available())
        }
        async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
            Ok(ValidationResult::Valid)
        }
        async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
            Ok(JobId::new("job-1"))
        }
        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(if n >= self.pending_polls {
                JobStatus::Completed
            } else {
                JobStatus::Queued
            })
        }
        async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
            Ok(ExecutionResult::counts(Counts::new(), 0))
        }
        async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
            Ok(())
        }
    }

    fn slow(pending_polls: u32) -> SlowBackend {
        SlowBackend {
            caps: Capabilities::quantinuum("slow", 2),
            pending_polls,
            polls: AtomicU32::new(0),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_completes() {
        let backend = slow(3);
        let result = backend
            .wait_for(&JobId::new("job-1"), Duration::from_secs(10), Duration::from_secs(1))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_times_out_with_job_id() {
        let backend = slow(u32::MAX);
        let err = backend
            .wait_for(&JobId::new("job-1"), Duration::from_secs(5), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Timeout(id) if id == "job-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_unbounded_timeout() {
        let backend = slow(2);
        let result = backend
            .wait_for(
                &JobId::new("job-1"),
                Duration::from_secs(u64::MAX),
                Duration::from_secs(1),
            )
            .await;
        assert!(result.is_ok());
        assert_eq!(backend.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_zero_timeout_polls_once() {
        let backend = slow(u32::MAX);
        let err = backend
            .wait_for(&JobId::new("job-1"), Duration::ZERO, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Timeout(_)));
        assert_eq!(backend.polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_default_transpile_is_unchanged() {
        let backend = slow(0);
        let circuit = Circuit::bell().unwrap();
        let transpiled = backend.transpile(&circuit).unwrap();
        assert!(!transpiled.compiled);
        assert_eq!(transpiled.circuit, circuit);
    }
}
