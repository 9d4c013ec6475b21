//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qbench_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{BasicRouting, BasisTranslation, CancelInverses, RemoveIdentities, TrivialLayout};
use crate::property::{BasisGates, CouplingMap, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit, properties))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}, swaps: {}",
            circuit.depth(),
            circuit.num_ops(),
            properties.swaps_inserted
        );

        Ok(())
    }

    /// Names of the passes in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    /// Optimization level (0-1).
    optimization_level: u8,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            properties: PropertySet::new(),
        }
    }

    /// Set the optimization level.
    ///
    /// - Level 0: only the transformations the target requires
    /// - Level 1: identity removal and inverse cancellation (default)
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(1);
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Set only the basis gates, leaving connectivity all-to-all.
    #[must_use]
    pub fn with_basis(mut self, basis_gates: BasisGates) -> Self {
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        let routed = self.properties.coupling_map.is_some();
        let translated = self.properties.basis_gates.is_some();

        if routed {
            pm.add_pass(TrivialLayout);
        }
        // Translate before routing so three-qubit gates are already
        // decomposed into two-qubit ones.
        if translated {
            pm.add_pass(BasisTranslation);
        }
        if routed {
            pm.add_pass(BasicRouting);
        }
        // Routing emits SWAPs, which need lowering again.
        if routed && translated {
            pm.add_pass(BasisTranslation);
        }

        if self.optimization_level >= 1 {
            pm.add_pass(RemoveIdentities);
            pm.add_pass(CancelInverses);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_ir::QubitId;

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new();
        let mut props = PropertySet::new();

        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        pm.run(&mut circuit, &mut props).unwrap();
        assert_eq!(circuit.num_ops(), 2);
    }

    #[test]
    fn test_builder_pass_order() {
        let (pm, props) = PassManagerBuilder::new()
            .with_target(CouplingMap::linear(5), BasisGates::rotations())
            .build();

        assert_eq!(
            pm.pass_names(),
            vec![
                "TrivialLayout",
                "BasisTranslation",
                "BasicRouting",
                "BasisTranslation",
                "RemoveIdentities",
                "CancelInverses",
            ]
        );
        assert!(props.coupling_map.is_some());
    }

    #[test]
    fn test_level_zero_has_no_optimization() {
        let (pm, _) = PassManagerBuilder::new()
            .with_optimization_level(0)
            .with_basis(BasisGates::rotations())
            .build();
        assert_eq!(pm.pass_names(), vec!["BasisTranslation"]);
    }

    #[test]
    fn test_full_pipeline_on_linear_target() {
        let mut circuit = Circuit::with_size("ghz", 3, 3);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(2))
            .unwrap()
            .measure_all()
            .unwrap();

        let (pm, mut props) = PassManagerBuilder::new()
            .with_target(CouplingMap::linear(3), BasisGates::rotations())
            .build();
        pm.run(&mut circuit, &mut props).unwrap();

        assert_eq!(props.swaps_inserted, 1);
        let basis = BasisGates::rotations();
        assert!(
            circuit
                .instructions()
                .iter()
                .filter_map(|i| i.as_gate())
                .all(|g| basis.contains(g.name()))
        );
        assert_eq!(circuit.instructions().iter().filter(|i| i.is_measure()).count(), 3);
    }
}
