//! End-to-end runs over the local simulators and scripted backends.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use qbench_core::{
    BenchmarkRecord, Orchestrator, RunObserver, RunOptions, render_table, sanitize,
};
use qbench_hal::{
    Backend, BackendAvailability, BackendConfig, BackendKind, BackendRegistry, Capabilities,
    Counts, ExecutionResult, HalError, HalResult, JobId, JobStatus, ValidationResult,
};
use qbench_ir::Circuit;

/// Backend whose submission always fails.
struct BrokenBackend {
    capabilities: Capabilities,
}

#[async_trait]
impl Backend for BrokenBackend {
    fn name(&self) -> &str {
        "broken"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::Valid)
    }

    async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
        Err(HalError::Backend("device exploded".into()))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        Err(HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        Err(HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

/// Hardware backend whose jobs never leave the queue.
struct QueuedDevice {
    capabilities: Capabilities,
}

#[async_trait]
impl Backend for QueuedDevice {
    fn name(&self) -> &str {
        "device"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::check(circuit, &self.capabilities))
    }

    async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
        Ok(JobId::new("hw-1"))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        Ok(JobStatus::Queued)
    }

    async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
        Err(HalError::JobFailed("not finished".into()))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

/// Hardware backend that reports an even Bell split after a few polls.
struct FinishingDevice {
    capabilities: Capabilities,
    polls: AtomicU32,
}

#[async_trait]
impl Backend for FinishingDevice {
    fn name(&self) -> &str {
        "finishing"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::check(circuit, &self.capabilities))
    }

    async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
        Ok(JobId::new("hw-2"))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        Ok(if self.polls.fetch_add(1, Ordering::SeqCst) >= 2 {
            JobStatus::Completed
        } else {
            JobStatus::Running
        })
    }

    async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
        let counts: Counts = [("00", 512), ("11", 512)].into_iter().collect();
        Ok(ExecutionResult::counts(counts, 1024))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    qbench_adapter_sim::register_all(&mut registry);
    registry.register_factory("broken", |_| {
        Ok(Box::new(BrokenBackend {
            capabilities: Capabilities::simulator("broken", 8),
        }))
    });
    registry.register_factory("device", |_| {
        Ok(Box::new(QueuedDevice {
            capabilities: Capabilities::quantinuum("device", 8)
                .with_gate_set(qbench_hal::GateSet::universal()),
        }))
    });
    registry.register_factory("finishing", |_| {
        Ok(Box::new(FinishingDevice {
            capabilities: Capabilities::quantinuum("finishing", 8)
                .with_gate_set(qbench_hal::GateSet::universal()),
            polls: AtomicU32::new(0),
        }))
    });
    registry
}

fn orchestrator(options: RunOptions) -> Orchestrator {
    Orchestrator::new(registry(), options)
}

fn by_name<'a>(records: &'a [BenchmarkRecord], name: &str) -> &'a BenchmarkRecord {
    records
        .iter()
        .find(|r| r.backend_name == name)
        .unwrap_or_else(|| panic!("no record for {name}"))
}

#[tokio::test]
async fn test_bell_across_simulators() {
    let orch = orchestrator(RunOptions::default());
    let records = orch
        .run(&Circuit::bell().unwrap(), &["unitary", "sampler", "statevector"])
        .await
        .unwrap();

    let names: Vec<_> = records.iter().map(|r| r.backend_name.as_str()).collect();
    assert_eq!(names, vec!["statevector", "unitary", "sampler"]);

    let baseline = by_name(&records, "statevector");
    assert_eq!(baseline.fidelity, Some(1.0));
    let dist = baseline.distribution().unwrap();
    assert!((dist["00"] - 0.5).abs() < 1e-9);
    assert!((dist["11"] - 0.5).abs() < 1e-9);

    let unitary = by_name(&records, "unitary");
    assert!((unitary.fidelity.unwrap() - 1.0).abs() < 1e-9);

    let sampler = by_name(&records, "sampler");
    assert!(sampler.fidelity.unwrap() > 0.95);
    assert_eq!(sampler.kind, BackendKind::Simulator);
    assert!(records.iter().all(|r| r.total_latency >= r.execution_time));
}

#[tokio::test]
async fn test_failing_backend_does_not_stop_run() {
    let orch = orchestrator(RunOptions::default());
    let records = orch
        .run(&Circuit::bell().unwrap(), &["statevector", "broken", "unitary"])
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    let broken = by_name(&records, "broken");
    assert!(broken.error().unwrap().contains("device exploded"));
    assert_eq!(broken.fidelity, None);
    assert_eq!(broken.pre_gate_count, 2);
    assert_eq!(broken.post_gate_count, 0);
    assert!(by_name(&records, "unitary").is_success());
}

#[tokio::test]
async fn test_failed_ground_truth_leaves_fidelity_unset() {
    let orch = orchestrator(RunOptions {
        ground_truth: "broken".into(),
        ..RunOptions::default()
    });
    let records = orch
        .run(&Circuit::bell().unwrap(), &["unitary", "broken"])
        .await
        .unwrap();

    assert_eq!(records[0].backend_name, "broken");
    assert!(records.iter().all(|r| r.fidelity.is_none()));
    assert!(by_name(&records, "unitary").is_success());
}

#[tokio::test]
async fn test_no_ground_truth_selected() {
    let orch = orchestrator(RunOptions::default());
    let records = orch
        .run(&Circuit::bell().unwrap(), &["unitary", "sampler"])
        .await
        .unwrap();
    assert!(records.iter().all(|r| r.is_success() && r.fidelity.is_none()));
}

#[tokio::test]
async fn test_qubit_ceiling_produces_error_record() {
    let orch = orchestrator(RunOptions {
        qubit_ceilings: BTreeMap::from([("unitary".to_string(), 2)]),
        ..RunOptions::default()
    });
    let records = orch
        .run(&Circuit::ghz(3).unwrap(), &["statevector", "unitary"])
        .await
        .unwrap();

    let unitary = by_name(&records, "unitary");
    let error = unitary.error().unwrap();
    assert!(error.contains("3 qubits"), "{error}");
    assert!(error.contains("ceiling for unitary is 2"), "{error}");
    assert_eq!(unitary.compilation_time, 0.0);
    assert!(by_name(&records, "statevector").is_success());
}

#[tokio::test]
async fn test_hardware_timeout_yields_queued_record() {
    let orch = orchestrator(RunOptions {
        hardware_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(10),
        ..RunOptions::default()
    });
    let records = orch
        .run(&Circuit::bell().unwrap(), &["statevector", "device"])
        .await
        .unwrap();

    let device = by_name(&records, "device");
    assert_eq!(device.kind, BackendKind::Hardware);
    assert_eq!(device.job_id(), Some("hw-1"));
    assert_eq!(device.fidelity, None);
    assert!(device.error().is_none());

    let table = render_table(&sanitize(&records));
    assert!(table.contains("still queued as job hw-1"));
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_hardware_timeout_waits_for_result() {
    let orch = orchestrator(RunOptions {
        hardware_timeout: Duration::from_secs(u64::MAX),
        poll_interval: Duration::from_millis(10),
        ..RunOptions::default()
    });
    let records = orch
        .run(&Circuit::bell().unwrap(), &["statevector", "finishing"])
        .await
        .unwrap();

    let device = by_name(&records, "finishing");
    assert!(device.is_success(), "{:?}", device.error());
    assert_eq!(device.job_id(), None);
    assert!((device.fidelity.unwrap() - 1.0).abs() < 1e-9);
}

fn seeded_sampler(options: RunOptions) -> Orchestrator {
    orchestrator(options).with_backend_config(
        "sampler",
        BackendConfig::new("sampler").with_extra("seed", serde_json::json!(7)),
    )
}

#[tokio::test]
async fn test_permuted_measurement_agrees_across_backends() {
    let circuit = qbench_qasm::parse(
        r#"
        OPENQASM 2.0;
        include "qelib1.inc";
        qreg q[2];
        creg c[2];
        x q[0];
        measure q[0] -> c[1];
        measure q[1] -> c[0];
        "#,
    )
    .unwrap();

    let records = seeded_sampler(RunOptions::default())
        .run(&circuit, &["statevector", "sampler", "unitary"])
        .await
        .unwrap();

    for name in ["statevector", "sampler", "unitary"] {
        let record = by_name(&records, name);
        let keys: Vec<_> = record.distribution().unwrap().keys().collect();
        assert_eq!(keys, vec!["10"], "{name}");
        assert!((record.fidelity.unwrap() - 1.0).abs() < 1e-9, "{name}");
    }
}

#[tokio::test]
async fn test_unmeasured_ancilla_is_summed_out() {
    let circuit = qbench_qasm::parse(
        r#"
        OPENQASM 2.0;
        include "qelib1.inc";
        qreg q[3];
        creg c[2];
        h q[0];
        cx q[0], q[1];
        x q[2];
        measure q[0] -> c[0];
        measure q[1] -> c[1];
        "#,
    )
    .unwrap();

    let records = seeded_sampler(RunOptions::default())
        .run(&circuit, &["statevector", "sampler"])
        .await
        .unwrap();

    let baseline = by_name(&records, "statevector").distribution().unwrap();
    assert_eq!(baseline.keys().collect::<Vec<_>>(), vec!["00", "11"]);
    assert!((baseline["00"] - 0.5).abs() < 1e-9);

    let sampler = by_name(&records, "sampler");
    assert!(sampler.distribution().unwrap().keys().all(|k| k.len() == 2));
    assert!(sampler.fidelity.unwrap() > 0.95);
}

#[derive(Default)]
struct Recorder {
    started: Vec<(String, usize, usize)>,
    finished: Vec<String>,
}

impl RunObserver for Recorder {
    fn backend_started(&mut self, name: &str, position: usize, total: usize) {
        self.started.push((name.to_string(), position, total));
    }

    fn backend_finished(&mut self, record: &BenchmarkRecord) {
        self.finished.push(record.backend_name.clone());
    }
}

#[tokio::test]
async fn test_observer_sees_execution_order() {
    let orch = orchestrator(RunOptions::default());
    let mut recorder = Recorder::default();
    orch.run_observed(
        &Circuit::bell().unwrap(),
        &["sampler", "statevector"],
        &mut recorder,
    )
    .await
    .unwrap();

    assert_eq!(
        recorder.started,
        vec![
            ("statevector".to_string(), 0, 2),
            ("sampler".to_string(), 1, 2)
        ]
    );
    assert_eq!(recorder.finished, vec!["statevector", "sampler"]);
}
