//! Simulation engines shared by the backends.

pub mod statevector;
pub mod unitary;

pub use statevector::Statevector;
pub use unitary::Unitary;
