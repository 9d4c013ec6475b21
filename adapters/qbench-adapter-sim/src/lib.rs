//! Local simulator backends for qbench.
//!
//! Three simulators cover the comparison baselines and the compiled-target
//! case:
//!
//! | Backend | Outcome | Compilation | Default limit |
//! |---------|---------|-------------|---------------|
//! | `statevector` | exact amplitudes | gate cancellation | 24 qubits |
//! | `unitary` | amplitudes via the full unitary | `rx`/`ry`/`rz`/`cx` basis | 12 qubits |
//! | `sampler` | shot counts | linear routing + basis | 20 qubits |
//!
//! Every simulator finishes inside `submit`, so `wait` returns on its first
//! poll.
//!
//! # Example
//!
//! ```ignore
//! use qbench_adapter_sim::StatevectorBackend;
//! use qbench_hal::Backend;
//! use qbench_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = StatevectorBackend::new();
//!     let circuit = Circuit::bell()?;
//!
//!     let job_id = backend.submit(&circuit, 1).await?;
//!     let result = backend.wait(&job_id).await?;
//!     println!("{:?}", result.outcome);
//!     Ok(())
//! }
//! ```

mod backends;
pub mod engine;
mod jobs;

pub use backends::{SamplerBackend, StatevectorBackend, UnitaryBackend};

use qbench_hal::BackendRegistry;

/// Register every local simulator under its default name.
pub fn register_all(registry: &mut BackendRegistry) {
    registry.register::<StatevectorBackend>("statevector");
    registry.register::<UnitaryBackend>("unitary");
    registry.register::<SamplerBackend>("sampler");
}
