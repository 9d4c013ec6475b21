//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use qbench_core::{BenchConfig, CircuitInput};
use qbench_hal::BackendRegistry;

/// Load and parse an OpenQASM 2.0 file.
pub fn load_circuit(path: &Path) -> Result<CircuitInput> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    CircuitInput::from_qasm(&source)
        .with_context(|| format!("Failed to parse circuit: {}", path.display()))
}

/// Load configuration from an optional YAML file plus `QBENCH_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<BenchConfig> {
    BenchConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid configuration".to_string(),
    })
}

/// Registry with every backend compiled into this binary.
pub fn default_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    qbench_adapter_sim::register_all(&mut registry);
    #[cfg(feature = "quantinuum")]
    registry.register::<qbench_adapter_quantinuum::QuantinuumBackend>("quantinuum");
    registry
}
