//! qbench backend for Quantinuum quantum computers.
//!
//! Connects to Quantinuum H1 and H2 ion-trap machines and their hosted
//! emulators through the Quantinuum cloud REST API
//! (`https://qapi.quantinuum.com/v1/`).
//!
//! # Machines
//!
//! | Machine | Qubits | Type |
//! |---------|--------|------|
//! | H2-1LE | 32 | Noiseless emulator |
//! | H2-1E | 32 | Noisy emulator |
//! | H1-1E | 20 | Noisy emulator |
//! | H2-1 | 32 | Hardware |
//! | H1-1 | 20 | Hardware |
//!
//! Every machine reports [`qbench_hal::BackendKind::Hardware`]: jobs go
//! through the remote queue and may outlive a benchmark's wait.
//!
//! # Authentication
//!
//! Credentials come from the backend config (`email` extra, `token` as the
//! password) or from the environment:
//!
//! ```bash
//! export QUANTINUUM_EMAIL="user@example.com"
//! export QUANTINUUM_PASSWORD="yourpassword"
//! ```
//!
//! # Example
//!
//! ```ignore
//! use qbench_adapter_quantinuum::QuantinuumBackend;
//! use qbench_hal::Backend;
//! use qbench_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = QuantinuumBackend::new()?;
//!     let compiled = backend.transpile(&Circuit::bell()?)?;
//!     let job_id = backend.submit(&compiled.circuit, 100).await?;
//!     let result = backend.wait(&job_id).await?;
//!     println!("{:?}", result.outcome);
//!     Ok(())
//! }
//! ```
//!
//! # Gate set
//!
//! Circuits are compiled to `rx`, `ry`, `rz` and `cx` and submitted as
//! `OPENQASM 2.0` with server-side optimisation disabled, so the service runs
//! what qbench compiled.

mod api;
mod backend;
mod error;

pub use api::BASE_URL;
pub use backend::{DEFAULT_MACHINE, QuantinuumBackend};
pub use error::{QuantinuumError, QuantinuumResult};
