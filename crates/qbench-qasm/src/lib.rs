//! `OpenQASM` 2.0 Parser and Emitter for qbench
//!
//! Benchmark circuits arrive as `OpenQASM` 2.0 text. This crate turns that
//! text into a [`qbench_ir::Circuit`] and serializes circuits back to QASM 2.0
//! for backends that accept source programs.
//!
//! # Supported Features
//!
//! | Feature | Status | Example |
//! |---------|--------|---------|
//! | Version declaration | ✅ | `OPENQASM 2.0;` |
//! | Standard header | ✅ | `include "qelib1.inc";` |
//! | Registers | ✅ | `qreg q[5];`, `creg c[5];` |
//! | Standard gates | ✅ | `h q[0];`, `cx q[0], q[1];` |
//! | Parameterized gates | ✅ | `u3(pi/2, 0, pi) q[0];` |
//! | Register broadcast | ✅ | `h q;`, `measure q -> c;` |
//! | Gate definitions | ✅ | `gate bell a, b { h a; cx a, b; }` |
//! | Barriers, reset | ✅ | `barrier q;`, `reset q[0];` |
//! | Classical control | ❌ | `if (c == 1) x q[0];` |
//! | Opaque gates | ❌ | `opaque g q;` |
//!
//! # Example
//!
//! ```rust
//! use qbench_qasm::{emit_qasm2, parse};
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! assert!(emit_qasm2(&circuit).contains("cx q[0], q[1];"));
//! ```

pub mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::emit_qasm2;
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_ast};
