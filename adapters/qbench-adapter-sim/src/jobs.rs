//! Job table shared by the simulator backends.
//!
//! Simulations run to completion inside `submit`, so every stored job is
//! already terminal. The table exists so the backends honour the same
//! submit/status/result protocol as remote devices.

use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use qbench_hal::{ExecutionResult, HalError, HalResult, Job, JobId, JobStatus};

/// Job data for a simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Thread-safe table of simulator jobs.
#[derive(Clone, Default)]
pub(crate) struct JobTable {
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
}

impl JobTable {
    fn lock(&self) -> MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a finished simulation and return its new job id.
    pub(crate) fn complete(&self, backend: &str, shots: u32, result: ExecutionResult) -> JobId {
        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots)
            .with_backend(backend)
            .with_status(JobStatus::Completed);
        self.lock().insert(
            job_id.0.clone(),
            SimJob {
                job,
                result: Some(result),
            },
        );
        job_id
    }

    pub(crate) fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.lock()
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    pub(crate) fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.lock();
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match (&sim_job.job.status, &sim_job.result) {
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (_, Some(result)) => Ok(result.clone()),
            (_, None) => Err(HalError::JobNotFound(job_id.0.clone())),
        }
    }

    /// Cancel a job. Finished jobs stay finished.
    pub(crate) fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.lock();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if sim_job.job.status.is_pending() {
            sim_job.job = sim_job.job.clone().with_status(JobStatus::Cancelled);
        }
        Ok(())
    }
}
