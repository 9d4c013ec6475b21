//! Target-agnostic compilation passes.
//!
//! These passes never consult the coupling map or basis gates and are safe
//! to run on any circuit.

pub mod optimization;

pub use optimization::{CancelInverses, RemoveIdentities};
