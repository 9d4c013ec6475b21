//! Cross-backend benchmarking for quantum circuits.
//!
//! One circuit is run on several backends, local simulators and remote
//! devices, and every run is reduced to a [`BenchmarkRecord`]:
//!
//! - [`normalizer`] turns raw amplitudes or shot counts into a probability
//!   [`Distribution`] and collects timing and compilation metrics
//! - [`fidelity`] scores a distribution against the ground-truth baseline
//!   with the Hellinger (Bhattacharyya) fidelity
//! - [`orchestrator`] runs the backends in order, ground truth first, and
//!   turns every failure into an error record for that backend alone
//! - [`sanitizer`] fills defaults into records for tabular output
//!
//! # Example
//!
//! ```ignore
//! use qbench_core::{BenchConfig, CircuitInput};
//! use qbench_hal::BackendRegistry;
//!
//! let input = CircuitInput::from_qasm(&std::fs::read_to_string("bell.qasm")?)?;
//! let mut registry = BackendRegistry::new();
//! qbench_adapter_sim::register_all(&mut registry);
//!
//! let config = BenchConfig::default();
//! let records = config
//!     .orchestrator(registry)
//!     .run(&input.circuit, &config.default_backends)
//!     .await?;
//! println!("{}", qbench_core::render_table(&qbench_core::sanitize(&records)));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod fidelity;
pub mod input;
pub mod normalizer;
pub mod orchestrator;
pub mod record;
pub mod report;
pub mod sanitizer;

pub use config::BenchConfig;
pub use error::{
    ConfigError, ExportError, InputShapeError, RecordError, ResourceLimitError, RunError,
};
pub use export::{ExportConfig, ExportFormat};
pub use fidelity::{compare, fidelity};
pub use input::{CircuitInput, CircuitSummary};
pub use normalizer::{
    CompileStats, MeasurementMap, RawRun, RunMetrics, distribution_from_counts,
    distribution_from_statevector, normalize,
};
pub use orchestrator::{DEFAULT_GROUND_TRUTH, Orchestrator, RunObserver, RunOptions};
pub use record::{BenchmarkRecord, Distribution, Outcome};
pub use report::{BenchmarkReport, RunSettings, SCHEMA_VERSION};
pub use sanitizer::{ReportRow, RowStatus, render_table, sanitize, success_probability};
