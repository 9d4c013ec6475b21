//! Error types for compilation.

use qbench_ir::IrError;
use thiserror::Error;

/// Errors raised by compilation passes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A routing pass ran without a coupling map.
    #[error("No coupling map configured for routing")]
    MissingCouplingMap,

    /// A routing pass ran before a layout was chosen.
    #[error("No qubit layout available")]
    MissingLayout,

    /// The circuit needs more qubits than the target provides.
    #[error("Circuit needs {required} qubits but the target has {available}")]
    CircuitTooLarge { required: usize, available: u32 },

    /// Two physical qubits have no connecting path.
    #[error("No path between physical qubits {from} and {to}")]
    Unroutable { from: u32, to: u32 },

    /// A gate acting on three or more qubits reached routing undecomposed.
    #[error("Gate '{0}' acts on more than two qubits and must be decomposed before routing")]
    WideGate(String),

    /// No rule rewrites the gate into the target basis.
    #[error("Gate '{0}' cannot be translated into the target basis")]
    UntranslatableGate(String),

    /// Circuit construction failed while rewriting.
    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
