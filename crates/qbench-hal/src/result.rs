//! Execution results.
//!
//! A backend returns either the final amplitudes of the simulated state or
//! the measured shot counts. Both are kept raw here; turning them into a
//! probability distribution is the caller's business.

use std::collections::BTreeMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Measurement counts keyed by bitstring.
///
/// Bitstrings put the highest classical bit first, so bit 0 is the rightmost
/// character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Count for one bitstring.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.0.values().sum()
    }

    /// Most frequent outcome, first in bitstring order on ties.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.0
            .iter()
            .fold(None, |best: Option<(&str, u64)>, (k, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((k.as_str(), v)),
            })
    }

    /// Iterate over `(bitstring, count)` pairs in bitstring order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no outcomes were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }
}

/// Raw backend output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawOutcome {
    /// Final state amplitudes indexed by basis state, qubit 0 least significant.
    Statevector(Vec<Complex64>),
    /// Shot counts.
    Counts(Counts),
}

/// Result of a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// What the backend produced.
    pub outcome: RawOutcome,
    /// Shots requested. Meaningless for statevector outcomes.
    pub shots: u32,
    /// Time the backend spent executing, as it reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Peak working memory of the execution, when the backend measures it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_bytes: Option<u64>,
}

impl ExecutionResult {
    /// Result carrying final amplitudes.
    pub fn statevector(amplitudes: Vec<Complex64>) -> Self {
        Self {
            outcome: RawOutcome::Statevector(amplitudes),
            shots: 0,
            execution_time_ms: None,
            memory_bytes: None,
        }
    }

    /// Result carrying shot counts.
    pub fn counts(counts: Counts, shots: u32) -> Self {
        Self {
            outcome: RawOutcome::Counts(counts),
            shots,
            execution_time_ms: None,
            memory_bytes: None,
        }
    }

    /// Set the reported execution time.
    #[must_use]
    pub fn with_execution_time_ms(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Set the measured memory.
    #[must_use]
    pub fn with_memory_bytes(mut self, bytes: u64) -> Self {
        self.memory_bytes = Some(bytes);
        self
    }
}
