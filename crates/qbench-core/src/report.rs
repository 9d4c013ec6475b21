//! Benchmark report: the records of one run plus context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::CircuitSummary;
use crate::orchestrator::RunOptions;
use crate::record::BenchmarkRecord;
use crate::sanitizer::{self, ReportRow};

/// Report schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Settings that shaped the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub ground_truth: String,
    pub shots: u32,
    pub hardware_timeout_seconds: u64,
}

impl From<&RunOptions> for RunSettings {
    fn from(options: &RunOptions) -> Self {
        Self {
            ground_truth: options.ground_truth.clone(),
            shots: options.shots,
            hardware_timeout_seconds: options.hardware_timeout.as_secs(),
        }
    }
}

/// Complete report of one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub schema_version: String,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub circuit: CircuitSummary,
    pub settings: RunSettings,
    /// Records in execution order.
    pub records: Vec<BenchmarkRecord>,
}

impl BenchmarkReport {
    pub fn new(
        circuit: CircuitSummary,
        options: &RunOptions,
        records: Vec<BenchmarkRecord>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            circuit,
            settings: RunSettings::from(options),
            records,
        }
    }

    /// Sanitized table rows.
    pub fn rows(&self) -> Vec<ReportRow> {
        sanitizer::sanitize(&self.records)
    }

    /// The ground-truth record, if it ran successfully.
    pub fn baseline(&self) -> Option<&BenchmarkRecord> {
        self.records
            .iter()
            .find(|r| r.backend_name == self.settings.ground_truth && r.is_success())
    }

    /// Number of records carrying an error.
    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| r.error().is_some()).count()
    }
}
