//! JSON export of benchmark reports.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ExportError;
use crate::report::BenchmarkReport;

/// What to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// The full report with raw records.
    #[default]
    Report,
    /// Only the sanitized table rows.
    Rows,
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub pretty: bool,
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            format: ExportFormat::Report,
        }
    }
}

/// Serialize a report to a JSON string.
pub fn to_json(report: &BenchmarkReport, config: &ExportConfig) -> Result<String, ExportError> {
    let value = match config.format {
        ExportFormat::Report => serde_json::to_value(report)?,
        ExportFormat::Rows => serde_json::to_value(report.rows())?,
    };
    let json = if config.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(json)
}

/// Write a report to a JSON file.
pub fn to_file(
    report: &BenchmarkReport,
    path: &Path,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    let json = to_json(report, config)?;
    std::fs::write(path, json)
        .map_err(|e| ExportError::Io(format!("Failed to write {}: {}", path.display(), e)))
}
