//! Benchmark configuration.
//!
//! Sources, lowest precedence first:
//! 1. Default values
//! 2. YAML configuration file
//! 3. Environment variables with the `QBENCH_` prefix
//!
//! Command-line flags are applied on top by the CLI.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use qbench_hal::{BackendConfig, BackendRegistry};

use crate::error::ConfigError;
use crate::orchestrator::{DEFAULT_GROUND_TRUTH, Orchestrator, RunOptions};

/// Complete benchmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Backend whose distribution is the fidelity baseline.
    #[serde(default = "default_ground_truth")]
    pub ground_truth: String,

    /// Shots requested from sampling backends.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Seed passed to backends that sample, unless their own config sets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Bounded wait for hardware jobs, in seconds.
    #[serde(default = "default_hardware_timeout")]
    pub hardware_timeout_seconds: u64,

    /// Hardware job status poll interval, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Backends to run when none are named on the command line.
    #[serde(default = "default_backends")]
    pub default_backends: Vec<String>,

    /// Per-backend qubit ceilings (name to max qubits).
    #[serde(default)]
    pub qubit_ceilings: BTreeMap<String, u32>,

    /// Per-backend settings such as `endpoint`, `machine` or `max_qubits`.
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfig>,
}

fn default_ground_truth() -> String {
    DEFAULT_GROUND_TRUTH.to_string()
}

fn default_shots() -> u32 {
    1024
}

fn default_hardware_timeout() -> u64 {
    60
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_backends() -> Vec<String> {
    vec!["statevector".into(), "unitary".into(), "sampler".into()]
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            ground_truth: default_ground_truth(),
            shots: default_shots(),
            seed: None,
            hardware_timeout_seconds: default_hardware_timeout(),
            poll_interval_ms: default_poll_interval(),
            default_backends: default_backends(),
            qubit_ceilings: BTreeMap::new(),
            backends: BTreeMap::new(),
        }
    }
}

impl BenchConfig {
    /// Parse YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&contents)
    }

    /// Load from an optional file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QBENCH_*` overrides read through `lookup`.
    ///
    /// Only variables that are set override; a set but unparsable value is a
    /// parse error.
    pub fn merge_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("{key}: invalid value '{value}'")))
        }

        if let Some(v) = lookup("QBENCH_GROUND_TRUTH") {
            self.ground_truth = v;
        }
        if let Some(v) = lookup("QBENCH_SHOTS") {
            self.shots = parsed("QBENCH_SHOTS", &v)?;
        }
        if let Some(v) = lookup("QBENCH_SEED") {
            self.seed = Some(parsed("QBENCH_SEED", &v)?);
        }
        if let Some(v) = lookup("QBENCH_HARDWARE_TIMEOUT") {
            self.hardware_timeout_seconds = parsed("QBENCH_HARDWARE_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("QBENCH_POLL_INTERVAL_MS") {
            self.poll_interval_ms = parsed("QBENCH_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("QBENCH_BACKENDS") {
            self.default_backends = split_list(&v);
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ground_truth.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ground_truth must name a backend".to_string(),
            ));
        }
        if self.shots == 0 {
            return Err(ConfigError::Validation(
                "shots must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if let Some(name) = self.default_backends.iter().find(|n| n.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "default_backends contains an empty name: {name:?}"
            )));
        }
        Ok(())
    }

    /// Orchestrator settings.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            ground_truth: self.ground_truth.clone(),
            shots: self.shots,
            hardware_timeout: Duration::from_secs(self.hardware_timeout_seconds),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            qubit_ceilings: self.qubit_ceilings.clone(),
        }
    }

    /// Settings for backend `name`, with the run seed filled in.
    pub fn backend_config(&self, name: &str) -> BackendConfig {
        let mut config = self
            .backends
            .get(name)
            .cloned()
            .unwrap_or_else(|| BackendConfig::new(name));
        if config.name.is_empty() {
            config.name = name.to_string();
        }
        if let Some(seed) = self.seed {
            config
                .extra
                .entry("seed")
                .or_insert_with(|| serde_json::Value::from(seed));
        }
        config
    }

    /// Build an orchestrator over `registry` with these settings.
    pub fn orchestrator(&self, registry: BackendRegistry) -> Orchestrator {
        let names: Vec<String> = registry.available_backends();
        names.into_iter().fold(
            Orchestrator::new(registry, self.run_options()),
            |orch, name| {
                let config = self.backend_config(&name);
                orch.with_backend_config(name, config)
            },
        )
    }

    /// Serialize to YAML. Tokens are never written.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml_ng::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Split a comma-separated list, dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
