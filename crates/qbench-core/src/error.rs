//! Error taxonomy for benchmark runs.
//!
//! Only [`RunError`] ever escapes the orchestrator. The other errors are
//! caught at the per-backend boundary and stored on that backend's record.

use qbench_hal::HalError;
use thiserror::Error;

/// Malformed input to one backend's record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputShapeError {
    /// Amplitude vector whose length is not `2^n`.
    #[error("amplitude vector length {0} is not a power of two")]
    AmplitudeLength(usize),

    /// Circuit text that could not be parsed.
    #[error("malformed circuit: {0}")]
    Circuit(String),
}

impl From<qbench_qasm::ParseError> for InputShapeError {
    fn from(e: qbench_qasm::ParseError) -> Self {
        InputShapeError::Circuit(e.to_string())
    }
}

/// Circuit wider than a backend's qubit ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuit needs {required} qubits but the ceiling for {backend} is {ceiling}")]
pub struct ResourceLimitError {
    pub backend: String,
    pub required: usize,
    pub ceiling: u32,
}

/// Why one backend produced an error record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    InputShape(#[from] InputShapeError),

    #[error(transparent)]
    ResourceLimit(#[from] ResourceLimitError),

    /// Failure raised by the adapter: unsupported gate, auth, network, job
    /// failure.
    #[error(transparent)]
    Backend(#[from] HalError),
}

/// Failure of a whole run. Nothing could be attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("no backend selected")]
    NoBackendSelected,

    #[error("circuit is empty: it needs at least one qubit and one operation")]
    EmptyCircuit,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Report export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
