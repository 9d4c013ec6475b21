//! Uniform report rows with documented defaults.
//!
//! | Field | Default when absent |
//! |-------|---------------------|
//! | `optimization_ratio` | 1.0, no change |
//! | `swap_overhead` | 0.0 |
//! | `gate_count_delta` | 0.0 |
//! | `success_probability` | 0.0 without a distribution |
//! | `fidelity` | stays absent |

use serde::{Deserialize, Serialize};

use qbench_hal::BackendKind;

use crate::record::{BenchmarkRecord, Outcome};

/// Row status, derived from the record outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Ok,
    Error,
    Queued,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Ok => write!(f, "ok"),
            RowStatus::Error => write!(f, "error"),
            RowStatus::Queued => write!(f, "queued"),
        }
    }
}

/// A record with every metric populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub backend_name: String,
    pub kind: BackendKind,
    pub status: RowStatus,
    pub compilation_time: f64,
    pub execution_time: f64,
    pub total_latency: f64,
    pub memory_bytes: u64,
    pub pre_gate_count: u64,
    pub post_gate_count: u64,
    pub optimization_ratio: f64,
    pub swap_overhead: f64,
    pub gate_count_delta: f64,
    /// Largest single-outcome probability.
    pub success_probability: f64,
    pub fidelity: Option<f64>,
    /// Error message or pending job id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&BenchmarkRecord> for ReportRow {
    fn from(record: &BenchmarkRecord) -> Self {
        let (status, detail) = match &record.outcome {
            Outcome::Distribution { .. } => (RowStatus::Ok, None),
            Outcome::Error { error } => (RowStatus::Error, Some(error.clone())),
            Outcome::Queued { job_id } => (RowStatus::Queued, Some(job_id.clone())),
        };
        Self {
            backend_name: record.backend_name.clone(),
            kind: record.kind,
            status,
            compilation_time: record.compilation_time,
            execution_time: record.execution_time,
            total_latency: record.total_latency,
            memory_bytes: record.memory_bytes,
            pre_gate_count: record.pre_gate_count,
            post_gate_count: record.post_gate_count,
            optimization_ratio: record.optimization_ratio.unwrap_or(1.0),
            swap_overhead: record.swap_overhead.unwrap_or(0.0),
            gate_count_delta: record.gate_count_delta.unwrap_or(0.0),
            success_probability: success_probability(record),
            fidelity: record.fidelity,
            detail,
        }
    }
}

/// Maximum single-outcome probability, 0.0 without a distribution.
pub fn success_probability(record: &BenchmarkRecord) -> f64 {
    record
        .distribution()
        .and_then(|d| d.values().copied().reduce(f64::max))
        .unwrap_or(0.0)
}

/// Sanitize records in order.
pub fn sanitize(records: &[BenchmarkRecord]) -> Vec<ReportRow> {
    records.iter().map(ReportRow::from).collect()
}

/// Render rows as a plain-text table. Absent fidelity renders as `-`.
pub fn render_table(rows: &[ReportRow]) -> String {
    const HEADERS: [&str; 11] = [
        "backend", "kind", "status", "compile s", "exec s", "total s", "memory", "gates",
        "opt ratio", "swaps", "fidelity",
    ];

    let body: Vec<[String; 11]> = rows
        .iter()
        .map(|row| {
            [
                row.backend_name.clone(),
                row.kind.to_string(),
                row.status.to_string(),
                format!("{:.4}", row.compilation_time),
                format!("{:.4}", row.execution_time),
                format!("{:.4}", row.total_latency),
                format_bytes(row.memory_bytes),
                format!("{} -> {}", row.pre_gate_count, row.post_gate_count),
                format!("{:.2}", row.optimization_ratio),
                format!("{:.0}", row.swap_overhead),
                row.fidelity
                    .map_or_else(|| "-".to_string(), |f| format!("{f:.4}")),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, cells: &mut dyn Iterator<Item = &str>| {
        let padded: Vec<String> = cells
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    };

    line(&mut out, &mut HEADERS.iter().copied());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&mut out, &mut rule.iter().map(String::as_str));
    for cells in &body {
        line(&mut out, &mut cells.iter().map(String::as_str));
    }
    for row in rows.iter().filter(|r| r.detail.is_some()) {
        let detail = row.detail.as_deref().unwrap_or_default();
        let note = match row.status {
            RowStatus::Queued => format!("{}: still queued as job {detail}\n", row.backend_name),
            _ => format!("{}: {detail}\n", row.backend_name),
        };
        out.push_str(&note);
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    match bytes {
        0 => "-".to_string(),
        b if b < 1024 => format!("{b} B"),
        b if b < 1024 * 1024 => format!("{:.1} KiB", b as f64 / 1024.0),
        b => format!("{:.1} MiB", b as f64 / (1024.0 * 1024.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Distribution;

    fn record(outcome: Outcome) -> BenchmarkRecord {
        BenchmarkRecord {
            backend_name: "sampler".into(),
            kind: BackendKind::Simulator,
            compilation_time: 0.001,
            execution_time: 0.002,
            total_latency: 0.003,
            memory_bytes: 2048,
            pre_gate_count: 2,
            post_gate_count: 5,
            optimization_ratio: None,
            swap_overhead: None,
            gate_count_delta: None,
            fidelity: None,
            outcome,
        }
    }

    fn distribution(entries: &[(&str, f64)]) -> Outcome {
        Outcome::Distribution {
            outcome_distribution: entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<Distribution>(),
        }
    }

    #[test]
    fn test_defaults_for_missing_metrics() {
        let row = ReportRow::from(&record(distribution(&[("0", 1.0)])));
        assert_eq!(row.optimization_ratio, 1.0);
        assert_eq!(row.swap_overhead, 0.0);
        assert_eq!(row.gate_count_delta, 0.0);
        assert_eq!(row.fidelity, None);
        assert_eq!(row.status, RowStatus::Ok);
    }

    #[test]
    fn test_present_metrics_kept() {
        let mut rec = record(distribution(&[("0", 1.0)]));
        rec.optimization_ratio = Some(2.5);
        rec.swap_overhead = Some(3.0);
        rec.gate_count_delta = Some(3.0);
        rec.fidelity = Some(0.9);
        let row = ReportRow::from(&rec);
        assert_eq!(row.optimization_ratio, 2.5);
        assert_eq!(row.swap_overhead, 3.0);
        assert_eq!(row.gate_count_delta, 3.0);
        assert_eq!(row.fidelity, Some(0.9));
    }

    #[test]
    fn test_success_probability() {
        let rec = record(distribution(&[("00", 0.25), ("11", 0.6), ("01", 0.15)]));
        assert_eq!(success_probability(&rec), 0.6);

        let failed = record(Outcome::Error {
            error: "boom".into(),
        });
        assert_eq!(success_probability(&failed), 0.0);
        assert_eq!(success_probability(&record(distribution(&[]))), 0.0);
    }

    #[test]
    fn test_status_and_detail() {
        let rows = sanitize(&[
            record(Outcome::Error {
                error: "boom".into(),
            }),
            record(Outcome::Queued {
                job_id: "job-1".into(),
            }),
        ]);
        assert_eq!(rows[0].status, RowStatus::Error);
        assert_eq!(rows[0].detail.as_deref(), Some("boom"));
        assert_eq!(rows[1].status, RowStatus::Queued);
        assert_eq!(rows[1].detail.as_deref(), Some("job-1"));
    }

    #[test]
    fn test_render_table() {
        let mut ok = record(distribution(&[("0", 1.0)]));
        ok.fidelity = Some(0.98765);
        let failed = record(Outcome::Error {
            error: "ceiling".into(),
        });
        let table = render_table(&sanitize(&[ok, failed]));
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("backend"));
        assert!(lines[2].contains("0.9877"));
        assert!(lines[2].contains("2.0 KiB"));
        assert!(lines[3].trim_end().ends_with('-'));
        assert_eq!(lines[4], "sampler: ceiling");
    }

    #[test]
    fn test_render_table_notes_queued_jobs() {
        let queued = record(Outcome::Queued {
            job_id: "job-7".into(),
        });
        let table = render_table(&sanitize(&[record(distribution(&[("0", 1.0)])), queued]));

        assert!(table.ends_with("sampler: still queued as job job-7\n"));
        assert_eq!(table.lines().count(), 5);
        assert!(table.lines().all(|line| line == line.trim_end()));
    }
}
