//! Built-in compilation passes.
//!
//! Passes are organized into two categories:
//! - [`agnostic`]: passes that only look at the instruction sequence
//! - [`target`]: passes that need the target's coupling map or basis

pub mod agnostic;
pub mod target;

pub use agnostic::{CancelInverses, RemoveIdentities};
pub use target::{BasicRouting, BasisTranslation, TrivialLayout};
