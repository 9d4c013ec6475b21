//! Quantum gate types.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Standard gates with known semantics.
///
/// Angles are plain radians. Symbolic parameters only exist inside QASM gate
/// bodies and are resolved before a gate reaches the IR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate, also spelled `u1` in QASM 2.0.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ), also `u3`.
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// Controlled rotation around X.
    CRx(f64),
    /// Controlled rotation around Y.
    CRy(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// Controlled phase gate, also `cu1`.
    CP(f64),
    /// ZZ rotation gate.
    RZZ(f64),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the QASM name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Get the numeric parameters of this gate, in QASM order.
    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RZZ(p) => vec![p],
            StandardGate::U(theta, phi, lambda) => vec![theta, phi, lambda],
            _ => vec![],
        }
    }

    /// Build a gate from its QASM name and evaluated parameters.
    ///
    /// Accepts the `qelib1.inc` aliases (`u1`, `u2`, `u3`, `cu1`, `cnot`).
    /// Returns `None` for an unknown name or a wrong parameter count.
    pub fn from_name(name: &str, params: &[f64]) -> Option<Self> {
        let gate = match (name, params) {
            ("id" | "i", []) => StandardGate::I,
            ("x", []) => StandardGate::X,
            ("y", []) => StandardGate::Y,
            ("z", []) => StandardGate::Z,
            ("h", []) => StandardGate::H,
            ("s", []) => StandardGate::S,
            ("sdg", []) => StandardGate::Sdg,
            ("t", []) => StandardGate::T,
            ("tdg", []) => StandardGate::Tdg,
            ("sx", []) => StandardGate::SX,
            ("sxdg", []) => StandardGate::SXdg,
            ("rx", [t]) => StandardGate::Rx(*t),
            ("ry", [t]) => StandardGate::Ry(*t),
            ("rz", [t]) => StandardGate::Rz(*t),
            ("p" | "u1", [l]) => StandardGate::P(*l),
            ("u2", [phi, lambda]) => StandardGate::U(PI / 2.0, *phi, *lambda),
            ("u" | "u3" | "U", [t, phi, lambda]) => StandardGate::U(*t, *phi, *lambda),
            ("cx" | "cnot" | "CX", []) => StandardGate::CX,
            ("cy", []) => StandardGate::CY,
            ("cz", []) => StandardGate::CZ,
            ("ch", []) => StandardGate::CH,
            ("swap", []) => StandardGate::Swap,
            ("crx", [t]) => StandardGate::CRx(*t),
            ("cry", [t]) => StandardGate::CRy(*t),
            ("crz", [t]) => StandardGate::CRz(*t),
            ("cp" | "cu1", [l]) => StandardGate::CP(*l),
            ("rzz", [t]) => StandardGate::RZZ(*t),
            ("ccx" | "toffoli", []) => StandardGate::CCX,
            ("cswap" | "fredkin", []) => StandardGate::CSwap,
            _ => return None,
        };
        Some(gate)
    }

    /// Signature `(num_qubits, num_params)` for a QASM gate name.
    pub fn signature(name: &str) -> Option<(u32, usize)> {
        let sig = match name {
            "id" | "i" | "x" | "y" | "z" | "h" | "s" | "sdg" | "t" | "tdg" | "sx" | "sxdg" => {
                (1, 0)
            }
            "rx" | "ry" | "rz" | "p" | "u1" => (1, 1),
            "u2" => (1, 2),
            "u" | "u3" | "U" => (1, 3),
            "cx" | "cnot" | "CX" | "cy" | "cz" | "ch" | "swap" => (2, 0),
            "crx" | "cry" | "crz" | "cp" | "cu1" | "rzz" => (2, 1),
            "ccx" | "toffoli" | "cswap" | "fredkin" => (3, 0),
            _ => return None,
        };
        Some(sig)
    }

    /// The inverse gate, exact up to global phase.
    pub fn inverse(&self) -> StandardGate {
        match *self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::SX => StandardGate::SXdg,
            StandardGate::SXdg => StandardGate::SX,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::P(l) => StandardGate::P(-l),
            StandardGate::U(theta, phi, lambda) => StandardGate::U(-theta, -lambda, -phi),
            StandardGate::CRx(t) => StandardGate::CRx(-t),
            StandardGate::CRy(t) => StandardGate::CRy(-t),
            StandardGate::CRz(t) => StandardGate::CRz(-t),
            StandardGate::CP(l) => StandardGate::CP(-l),
            StandardGate::RZZ(t) => StandardGate::RZZ(-t),
            // Self-inverse gates.
            other => other,
        }
    }

    /// Whether the gate acts as identity (up to global phase).
    pub fn is_identity(&self, tolerance: f64) -> bool {
        let near_zero = |angle: f64| {
            let wrapped = angle.rem_euclid(2.0 * PI);
            wrapped < tolerance || (2.0 * PI - wrapped) < tolerance
        };
        match *self {
            StandardGate::I => true,
            StandardGate::Rx(t) | StandardGate::Ry(t) | StandardGate::Rz(t) => {
                // Rotations have period 4π but are identity up to phase at 2π.
                near_zero(t)
            }
            StandardGate::P(l) | StandardGate::CP(l) => near_zero(l),
            StandardGate::RZZ(t) => near_zero(t),
            StandardGate::U(theta, phi, lambda) => near_zero(theta) && near_zero(phi + lambda),
            _ => false,
        }
    }

    /// Whether the gate acts on two qubits.
    #[inline]
    pub fn is_two_qubit(&self) -> bool {
        self.num_qubits() == 2
    }
}
