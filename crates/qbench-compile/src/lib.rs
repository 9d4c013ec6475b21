//! Circuit compilation for qbench backends.
//!
//! Each backend compiles the input circuit to what it can execute before the
//! benchmark clock for execution starts. The compilation pipeline is a list
//! of passes sharing a [`PropertySet`]:
//!
//! 1. **Layout**: map logical qubits to physical qubits
//! 2. **Translation**: rewrite gates into the target basis
//! 3. **Routing**: insert SWAPs so two-qubit gates act on coupled qubits
//! 4. **Optimization**: drop identities, cancel inverse pairs, fuse rotations
//!
//! ```text
//! Input Circuit
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (coupling map, basis gates, layout)
//! +-------------+
//!       |
//!       +-- TrivialLayout
//!       +-- BasisTranslation
//!       +-- BasicRouting
//!       +-- BasisTranslation (SWAP lowering)
//!       +-- RemoveIdentities / CancelInverses
//!       |
//!       v
//! Output Circuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use qbench_compile::{BasisGates, CouplingMap, PassManagerBuilder};
//! use qbench_ir::Circuit;
//!
//! let mut circuit = Circuit::ghz(4).unwrap();
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_target(CouplingMap::linear(4), BasisGates::rotations())
//!     .build();
//!
//! pm.run(&mut circuit, &mut props).unwrap();
//! println!("swaps inserted: {}", props.swaps_inserted);
//! ```
//!
//! # Optimization Levels
//!
//! | Level | Passes Included |
//! |-------|-----------------|
//! | 0 | Layout, translation, routing |
//! | 1 | Level 0 + RemoveIdentities, CancelInverses |

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, CouplingMap, Layout, PropertySet};
