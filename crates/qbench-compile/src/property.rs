//! `PropertySet` and the target description shared between passes.
//!
//! During compilation, passes need to share information:
//! - the **layout pass** decides which physical qubit hosts each logical qubit
//! - the **routing pass** reads the coupling map and moves qubits with SWAPs
//! - the **translation pass** reads the basis gates
//!
//! Routing also records how many SWAPs it inserted so the benchmark report can
//! show the connectivity overhead of a target.
//!
//! ```
//! use qbench_compile::{BasisGates, CouplingMap, PropertySet};
//!
//! let props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::rotations());
//! assert!(props.coupling_map.is_some());
//! assert!(props.basis_gates.as_ref().unwrap().contains("cx"));
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use qbench_ir::QubitId;

/// A bijective mapping from logical qubits to physical qubits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    logical_to_physical: Vec<u32>,
    physical_to_logical: Vec<Option<u32>>,
}

impl Layout {
    /// Create a trivial layout (logical qubit i -> physical qubit i) on a
    /// device with `num_physical` qubits.
    pub fn trivial(num_logical: u32, num_physical: u32) -> Self {
        let logical_to_physical = (0..num_logical).collect();
        let physical_to_logical = (0..num_physical)
            .map(|p| (p < num_logical).then_some(p))
            .collect();
        Self {
            logical_to_physical,
            physical_to_logical,
        }
    }

    /// Get the physical qubit for a logical qubit.
    pub fn physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(logical.index()).copied()
    }

    /// Get the logical qubit hosted on a physical qubit.
    pub fn logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical
            .get(physical as usize)
            .copied()
            .flatten()
            .map(QubitId)
    }

    /// Exchange the logical qubits hosted on two physical qubits.
    pub fn swap(&mut self, p1: u32, p2: u32) {
        let (i1, i2) = (p1 as usize, p2 as usize);
        self.physical_to_logical.swap(i1, i2);
        if let Some(l) = self.physical_to_logical[i1] {
            self.logical_to_physical[l as usize] = p1;
        }
        if let Some(l) = self.physical_to_logical[i2] {
            self.logical_to_physical[l as usize] = p2;
        }
    }

    /// Number of mapped logical qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// Physical qubit of each logical qubit, indexed by logical qubit.
    pub fn as_slice(&self) -> &[u32] {
        &self.logical_to_physical
    }
}

/// Target device coupling map.
///
/// The coupling map defines which pairs of physical qubits can interact with
/// two-qubit gates. A predecessor matrix is precomputed with one BFS per node
/// so routing can rebuild shortest paths without searching per gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingMap {
    /// Connected qubit pairs (bidirectional).
    edges: Vec<(u32, u32)>,
    /// Number of physical qubits.
    num_qubits: u32,
    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
    /// `pred_matrix[from][to]` is the node before `to` on a shortest path, or
    /// `u32::MAX` when unreachable.
    #[serde(skip)]
    pred_matrix: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Create a coupling map with no edges.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            edges: vec![],
            num_qubits,
            adjacency: FxHashMap::default(),
            pred_matrix: vec![],
        }
    }

    /// Add an edge between two qubits (bidirectional). Duplicates are ignored.
    pub fn add_edge(&mut self, q1: u32, q2: u32) {
        if self.is_connected(q1, q2) {
            return;
        }
        self.edges.push((q1, q2));
        self.adjacency.entry(q1).or_default().push(q2);
        self.adjacency.entry(q2).or_default().push(q1);
        self.pred_matrix.clear();
    }

    fn precompute_paths(&mut self) {
        let n = self.num_qubits as usize;
        self.pred_matrix = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            let mut seen = vec![false; n];
            seen[src] = true;
            let mut queue = VecDeque::from([src as u32]);
            while let Some(current) = queue.pop_front() {
                for &neighbor in self.adjacency.get(&current).into_iter().flatten() {
                    let nb = neighbor as usize;
                    if !seen[nb] {
                        seen[nb] = true;
                        self.pred_matrix[src][nb] = current;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Rebuild adjacency and path caches, e.g. after deserialization.
    pub fn rebuild_caches(&mut self) {
        self.adjacency.clear();
        for &(q1, q2) in &self.edges {
            self.adjacency.entry(q1).or_default().push(q2);
            self.adjacency.entry(q2).or_default().push(q1);
        }
        self.precompute_paths();
    }

    /// Check if two qubits are directly connected.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(&q1)
            .is_some_and(|neighbors| neighbors.contains(&q2))
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the coupling edges.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Whether every pair of qubits is directly connected.
    pub fn is_all_to_all(&self) -> bool {
        let n = u64::from(self.num_qubits);
        self.edges.len() as u64 == n * n.saturating_sub(1) / 2
    }

    /// Create a linear coupling map (0-1-2-3-...).
    pub fn linear(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n.saturating_sub(1) {
            map.add_edge(i, i + 1);
        }
        map.precompute_paths();
        map
    }

    /// Create a fully connected coupling map.
    pub fn full(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                map.add_edge(i, j);
            }
        }
        map.precompute_paths();
        map
    }

    /// Create a star topology (qubit 0 connected to all others).
    pub fn star(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 1..n {
            map.add_edge(0, i);
        }
        map.precompute_paths();
        map
    }

    /// Shortest path `from -> to` inclusive of both ends, or `None` if the
    /// qubits are disconnected or out of range.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        if from == to {
            return Some(vec![from]);
        }
        let preds = self.pred_matrix.get(from as usize)?;
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            let pred = *preds.get(current as usize)?;
            if pred == u32::MAX {
                return None;
            }
            path.push(pred);
            current = pred;
        }
        path.reverse();
        Some(path)
    }

    /// Number of edges on the shortest path between two qubits.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        self.shortest_path(from, to)
            .map(|p| u32::try_from(p.len() - 1).unwrap_or(u32::MAX))
    }
}

/// Basis gates for the target device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisGates {
    gates: Vec<String>,
}

impl BasisGates {
    /// Create a new basis gate set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a gate is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// Get the basis gates.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// Single-qubit rotations plus CNOT.
    pub fn rotations() -> Self {
        Self::new(["rx", "ry", "rz", "cx"])
    }

    /// Quantinuum-style target: Z rotations, X/Y rotations and CNOT.
    ///
    /// The hosted compiler rebases CNOT onto native ZZ interactions, so qbench
    /// stops at the rotation basis and leaves the final rebase to the service.
    pub fn quantinuum() -> Self {
        Self::rotations()
    }
}

/// Shared state passed through all compilation passes.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Target connectivity; `None` means all-to-all.
    pub coupling_map: Option<CouplingMap>,
    /// Target gate set; `None` keeps every gate.
    pub basis_gates: Option<BasisGates>,
    /// Current logical-to-physical layout, updated by routing.
    pub layout: Option<Layout>,
    /// SWAP gates inserted by routing.
    pub swaps_inserted: u32,
}

impl PropertySet {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.coupling_map = Some(coupling_map);
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Set only the basis gates.
    #[must_use]
    pub fn with_basis(mut self, basis_gates: BasisGates) -> Self {
        self.basis_gates = Some(basis_gates);
        self
    }
}
