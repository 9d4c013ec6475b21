//! The per-backend benchmark record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use qbench_hal::BackendKind;

/// Bitstring to probability. Qubit 0 is the rightmost character.
pub type Distribution = BTreeMap<String, f64>;

/// What a backend run produced.
///
/// Serialized flat into the record, so exactly one of
/// `outcome_distribution`, `error` or `job_id` appears in the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    /// The run completed with a measurement distribution.
    Distribution { outcome_distribution: Distribution },
    /// The run failed.
    Error { error: String },
    /// A hardware job was still pending when the bounded wait expired.
    Queued { job_id: String },
}

/// One row of a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub backend_name: String,
    pub kind: BackendKind,
    /// Seconds spent in backend-specific compilation.
    pub compilation_time: f64,
    /// Seconds spent submitting and waiting for the result.
    pub execution_time: f64,
    /// Seconds for the whole backend call.
    pub total_latency: f64,
    /// Peak working memory reported by the adapter, 0 if unmeasured.
    pub memory_bytes: u64,
    pub pre_gate_count: u64,
    pub post_gate_count: u64,
    /// `post_gate_count / pre_gate_count`, when the backend compiled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_ratio: Option<f64>,
    /// SWAP gates inserted by routing, when the backend routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_overhead: Option<f64>,
    /// `post_gate_count - pre_gate_count`, when the backend compiled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_count_delta: Option<f64>,
    /// Fidelity against the baseline, absent when not computable.
    pub fidelity: Option<f64>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl BenchmarkRecord {
    /// Measurement distribution, if the run completed.
    pub fn distribution(&self) -> Option<&Distribution> {
        match &self.outcome {
            Outcome::Distribution {
                outcome_distribution,
            } => Some(outcome_distribution),
            _ => None,
        }
    }

    /// Failure message, if the run failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error { error } => Some(error),
            _ => None,
        }
    }

    /// Pending job id, if the run is still queued.
    pub fn job_id(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Queued { job_id } => Some(job_id),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Distribution { .. })
    }

    /// Copy of this record with its fidelity set.
    #[must_use]
    pub fn with_fidelity(mut self, fidelity: Option<f64>) -> Self {
        self.fidelity = fidelity;
        self
    }
}
