//! Backend capability introspection.
//!
//! Describes what a backend can do: qubit count, supported gates and
//! connectivity. The orchestrator reads `num_qubits` as the default qubit
//! ceiling; adapters use the gate set to validate compiled circuits.
//!
//! All edges in [`Topology`] are bidirectional.

use serde::{Deserialize, Serialize};

/// Whether a backend simulates classically or runs on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Local classical simulator.
    Simulator,
    /// Remote quantum hardware or a hosted emulator of it.
    Hardware,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Simulator => write!(f, "simulator"),
            BackendKind::Hardware => write!(f, "hardware"),
        }
    }
}

/// Hardware capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (QASM naming).
    pub gate_set: GateSet,
    /// Qubit connectivity. All edges are bidirectional.
    pub topology: Topology,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Capability flags, e.g. `"statevector"`, `"counts"`, `"unitary"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for a local simulator with all-to-all connectivity.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec![],
        }
    }

    /// Create capabilities for Quantinuum ion-trap devices.
    ///
    /// All Quantinuum hardware has all-to-all qubit connectivity.
    pub fn quantinuum(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::rotations(),
            topology: Topology::full(num_qubits),
            max_shots: 10_000,
            is_simulator: false,
            features: vec!["counts".into(), "mid_circuit_measurement".into()],
        }
    }

    /// Set the topology.
    #[must_use]
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Set the gate set.
    #[must_use]
    pub fn with_gate_set(mut self, gate_set: GateSet) -> Self {
        self.gate_set = gate_set;
        self
    }

    /// Add a capability flag.
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Backend kind derived from `is_simulator`.
    pub fn kind(&self) -> BackendKind {
        if self.is_simulator {
            BackendKind::Simulator
        } else {
            BackendKind::Hardware
        }
    }

    /// Check whether a capability flag is set.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Set of gates a backend accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Three-qubit gates supported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
}

fn names(gates: &[&str]) -> Vec<String> {
    gates.iter().map(|g| (*g).to_string()).collect()
}

impl GateSet {
    /// Every gate the qbench IR knows.
    pub fn universal() -> Self {
        Self {
            single_qubit: names(&[
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz",
                "p", "u",
            ]),
            two_qubit: names(&[
                "cx", "cy", "cz", "ch", "swap", "crx", "cry", "crz", "cp", "rzz",
            ]),
            three_qubit: names(&["ccx", "cswap"]),
        }
    }

    /// Single-qubit rotations plus CNOT.
    pub fn rotations() -> Self {
        Self {
            single_qubit: names(&["rx", "ry", "rz"]),
            two_qubit: names(&["cx"]),
            three_qubit: vec![],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate)
            || self.two_qubit.iter().any(|g| g == gate)
            || self.three_qubit.iter().any(|g| g == gate)
    }

    /// All supported gate names.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.single_qubit
            .iter()
            .chain(&self.two_qubit)
            .chain(&self.three_qubit)
            .map(String::as_str)
    }
}

/// Qubit connectivity topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// Kind of topology.
    pub kind: TopologyKind,
    /// Coupling edges (pairs of connected qubits). Bidirectional.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Create a linear topology.
    pub fn linear(n: u32) -> Self {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self {
            kind: TopologyKind::Linear,
            edges,
        }
    }

    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// Check if two qubits are connected.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        (self.kind == TopologyKind::FullyConnected && q1 != q2)
            || self
                .edges
                .iter()
                .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    /// Fully connected (all-to-all).
    FullyConnected,
    /// Linear chain.
    Linear,
}
