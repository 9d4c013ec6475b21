//! Raw backend output to [`BenchmarkRecord`].
//!
//! Pure transforms: timing and memory are measured by the caller and passed
//! in through [`RunMetrics`].

use num_complex::Complex64;

use qbench_hal::{BackendKind, Counts, JobId, RawOutcome};
use qbench_ir::Circuit;

use crate::error::{InputShapeError, RecordError};
use crate::record::{BenchmarkRecord, Distribution, Outcome};

/// Probabilities below this are dropped from statevector distributions.
pub const PROBABILITY_THRESHOLD: f64 = 1e-9;

/// Convert an amplitude vector of length `2^n` to a distribution over
/// `n`-bit strings.
pub fn distribution_from_statevector(
    amplitudes: &[Complex64],
) -> Result<Distribution, InputShapeError> {
    let len = amplitudes.len();
    if !len.is_power_of_two() {
        return Err(InputShapeError::AmplitudeLength(len));
    }
    let width = len.trailing_zeros() as usize;

    Ok(amplitudes
        .iter()
        .enumerate()
        .filter_map(|(index, amp)| {
            let p = amp.norm_sqr();
            (p >= PROBABILITY_THRESHOLD).then(|| (bitstring(index, width), p))
        })
        .collect())
}

fn bitstring(index: usize, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    format!("{index:0width$b}")
}

/// Convert shot counts to a distribution. Zero shots give an empty one.
#[allow(clippy::cast_precision_loss)]
pub fn distribution_from_counts(counts: &Counts) -> Distribution {
    let total = counts.total_shots();
    if total == 0 {
        return Distribution::new();
    }
    counts
        .iter()
        .map(|(bits, n)| (bits.to_string(), n as f64 / total as f64))
        .collect()
}

/// Which qubit each classical bit of a circuit reads.
///
/// Shot counts are keyed by classical bits, highest first; amplitudes are
/// keyed by qubits. Projecting a statevector distribution through this map
/// puts both in the classical-bit key space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementMap {
    /// Indexed by classical bit. `None` for bits no measurement writes.
    sources: Vec<Option<usize>>,
}

impl MeasurementMap {
    /// Map of `circuit`'s measurements. The last measurement into a
    /// classical bit wins.
    ///
    /// A circuit without measurements maps as if every qubit were measured
    /// into the classical bit of the same index, which is what sampling
    /// backends run.
    pub fn of(circuit: &Circuit) -> Self {
        if !circuit.has_measurements() {
            let width = circuit.num_clbits().max(circuit.num_qubits());
            return Self {
                sources: (0..width)
                    .map(|c| (c < circuit.num_qubits()).then_some(c))
                    .collect(),
            };
        }

        let mut sources = vec![None; circuit.num_clbits()];
        for inst in circuit.instructions().iter().filter(|i| i.is_measure()) {
            for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                if let Some(slot) = sources.get_mut(c.index()) {
                    *slot = Some(q.index());
                }
            }
        }
        Self { sources }
    }

    /// Map from explicit sources, indexed by classical bit.
    pub fn from_sources(sources: Vec<Option<usize>>) -> Self {
        Self { sources }
    }

    pub fn num_clbits(&self) -> usize {
        self.sources.len()
    }

    /// Marginalize a qubit-keyed distribution onto the classical bits.
    ///
    /// Unmeasured qubits are summed out and unwritten classical bits read 0.
    pub fn project(&self, dist: &Distribution) -> Distribution {
        let mut projected = Distribution::new();
        for (key, p) in dist {
            let bits = key.as_bytes();
            let qubit_bit = |q: usize| {
                bits.len()
                    .checked_sub(q + 1)
                    .map_or('0', |pos| char::from(bits[pos]))
            };
            let clbits: String = self
                .sources
                .iter()
                .rev()
                .map(|source| source.map_or('0', qubit_bit))
                .collect();
            *projected.entry(clbits).or_insert(0.0) += p;
        }
        projected
    }
}

/// Circuit size before and after a backend compiled it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompileStats {
    pub pre_gate_count: u64,
    pub post_gate_count: u64,
    /// Whether the backend compiled at all.
    pub compiled: bool,
    /// SWAPs inserted, for backends that route.
    pub swaps_inserted: Option<u32>,
}

impl CompileStats {
    /// Stats for a backend that ran the circuit as given.
    pub fn unchanged(gate_count: u64) -> Self {
        Self {
            pre_gate_count: gate_count,
            post_gate_count: gate_count,
            compiled: false,
            swaps_inserted: None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn optimization_ratio(&self) -> Option<f64> {
        (self.compiled && self.pre_gate_count > 0)
            .then(|| self.post_gate_count as f64 / self.pre_gate_count as f64)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn gate_count_delta(&self) -> Option<f64> {
        self.compiled
            .then(|| self.post_gate_count as f64 - self.pre_gate_count as f64)
    }

    pub fn swap_overhead(&self) -> Option<f64> {
        self.swaps_inserted.map(f64::from)
    }
}

/// Measurements taken around one backend call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunMetrics {
    pub compilation_time: f64,
    pub execution_time: f64,
    pub total_latency: f64,
    pub memory_bytes: u64,
    pub compile: CompileStats,
}

/// What came back from a backend call that did not fail.
#[derive(Debug, Clone)]
pub enum RawRun {
    Completed(RawOutcome),
    /// The bounded wait expired with the job still pending.
    Queued(JobId),
}

/// Build the record for one backend call.
///
/// Statevector outcomes are projected through `measurements` when given, so
/// they share a key space with shot counts of the same circuit.
///
/// A failed call, or an outcome that cannot be converted, yields an error
/// record. Error records keep the backend identity, the input gate count and
/// the latency up to the failure; every other metric is zeroed or absent.
pub fn normalize(
    backend_name: &str,
    kind: BackendKind,
    metrics: &RunMetrics,
    measurements: Option<&MeasurementMap>,
    raw: Result<RawRun, RecordError>,
) -> BenchmarkRecord {
    let outcome = raw.and_then(|run| match run {
        RawRun::Completed(RawOutcome::Statevector(amps)) => {
            let dist = distribution_from_statevector(&amps)?;
            let outcome_distribution = match measurements {
                Some(map) => map.project(&dist),
                None => dist,
            };
            Ok(Outcome::Distribution {
                outcome_distribution,
            })
        }
        RawRun::Completed(RawOutcome::Counts(counts)) => Ok(Outcome::Distribution {
            outcome_distribution: distribution_from_counts(&counts),
        }),
        RawRun::Queued(job_id) => Ok(Outcome::Queued { job_id: job_id.0 }),
    });

    match outcome {
        Ok(outcome) => BenchmarkRecord {
            backend_name: backend_name.to_string(),
            kind,
            compilation_time: metrics.compilation_time,
            execution_time: metrics.execution_time,
            total_latency: metrics.total_latency,
            memory_bytes: metrics.memory_bytes,
            pre_gate_count: metrics.compile.pre_gate_count,
            post_gate_count: metrics.compile.post_gate_count,
            optimization_ratio: metrics.compile.optimization_ratio(),
            swap_overhead: metrics.compile.swap_overhead(),
            gate_count_delta: metrics.compile.gate_count_delta(),
            fidelity: None,
            outcome,
        },
        Err(e) => BenchmarkRecord {
            backend_name: backend_name.to_string(),
            kind,
            compilation_time: 0.0,
            execution_time: 0.0,
            total_latency: metrics.total_latency,
            memory_bytes: 0,
            pre_gate_count: metrics.compile.pre_gate_count,
            post_gate_count: 0,
            optimization_ratio: None,
            swap_overhead: None,
            gate_count_delta: None,
            fidelity: None,
            outcome: Outcome::Error {
                error: e.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_hal::HalError;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn metrics() -> RunMetrics {
        RunMetrics {
            compilation_time: 0.25,
            execution_time: 0.5,
            total_latency: 0.75,
            memory_bytes: 256,
            compile: CompileStats {
                pre_gate_count: 4,
                post_gate_count: 6,
                compiled: true,
                swaps_inserted: Some(1),
            },
        }
    }

    #[test]
    fn test_bell_statevector() {
        let dist =
            distribution_from_statevector(&[c(FRAC_1_SQRT_2), c(0.0), c(0.0), c(FRAC_1_SQRT_2)])
                .unwrap();
        assert_eq!(dist.len(), 2);
        assert!((dist["00"] - 0.5).abs() < 1e-6);
        assert!((dist["11"] - 0.5).abs() < 1e-6);
        assert!(!dist.contains_key("01"));
    }

    #[test]
    fn test_statevector_bit_order() {
        // Amplitude index 1 sets qubit 0, the rightmost character.
        let dist = distribution_from_statevector(&[c(0.0), c(1.0), c(0.0), c(0.0)]).unwrap();
        assert_eq!(dist.keys().collect::<Vec<_>>(), vec!["01"]);
    }

    #[test]
    fn test_statevector_drops_tiny_amplitudes() {
        let tiny = 1e-5; // probability 1e-10
        let dist = distribution_from_statevector(&[c(1.0), c(tiny)]).unwrap();
        assert_eq!(dist.len(), 1);
        assert!(dist.contains_key("0"));
    }

    #[test]
    fn test_statevector_length_must_be_power_of_two() {
        assert_eq!(
            distribution_from_statevector(&[c(1.0), c(0.0), c(0.0)]),
            Err(InputShapeError::AmplitudeLength(3))
        );
        assert_eq!(
            distribution_from_statevector(&[]),
            Err(InputShapeError::AmplitudeLength(0))
        );
    }

    #[test]
    fn test_single_amplitude_is_zero_qubits() {
        let dist = distribution_from_statevector(&[c(1.0)]).unwrap();
        assert_eq!(dist[""], 1.0);
    }

    #[test]
    fn test_counts() {
        let counts: Counts = [("00", 750), ("11", 250)].into_iter().collect();
        let dist = distribution_from_counts(&counts);
        assert!((dist["00"] - 0.75).abs() < 1e-12);
        assert!((dist["11"] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_counts() {
        assert!(distribution_from_counts(&Counts::new()).is_empty());
    }

    #[test]
    fn test_compile_stats_derived_metrics() {
        let stats = metrics().compile;
        assert_eq!(stats.optimization_ratio(), Some(1.5));
        assert_eq!(stats.gate_count_delta(), Some(2.0));
        assert_eq!(stats.swap_overhead(), Some(1.0));

        let unchanged = CompileStats::unchanged(4);
        assert_eq!(unchanged.optimization_ratio(), None);
        assert_eq!(unchanged.gate_count_delta(), None);
        assert_eq!(unchanged.swap_overhead(), None);

        let empty = CompileStats {
            compiled: true,
            ..CompileStats::default()
        };
        assert_eq!(empty.optimization_ratio(), None);
    }

    #[test]
    fn test_normalize_success() {
        let counts: Counts = [("0", 3), ("1", 1)].into_iter().collect();
        let record = normalize(
            "sampler",
            BackendKind::Simulator,
            &metrics(),
            None,
            Ok(RawRun::Completed(RawOutcome::Counts(counts))),
        );
        assert!(record.is_success());
        assert_eq!(record.memory_bytes, 256);
        assert_eq!(record.optimization_ratio, Some(1.5));
        assert_eq!(record.swap_overhead, Some(1.0));
        assert_eq!(record.fidelity, None);
    }

    #[test]
    fn test_normalize_error_has_no_partial_metrics() {
        let record = normalize(
            "unitary",
            BackendKind::Simulator,
            &metrics(),
            None,
            Err(HalError::Unsupported("reset".into()).into()),
        );
        assert!(record.error().unwrap().contains("reset"));
        assert!(record.distribution().is_none());
        assert_eq!(record.memory_bytes, 0);
        assert_eq!(record.post_gate_count, 0);
        assert_eq!(record.optimization_ratio, None);
        assert_eq!(record.pre_gate_count, 4);
        assert_eq!(record.total_latency, 0.75);
    }

    #[test]
    fn test_normalize_bad_shape_is_error() {
        let record = normalize(
            "statevector",
            BackendKind::Simulator,
            &metrics(),
            None,
            Ok(RawRun::Completed(RawOutcome::Statevector(vec![c(1.0); 3]))),
        );
        assert!(record.error().unwrap().contains("power of two"));
    }

    fn clbit(i: u32) -> qbench_ir::ClbitId {
        qbench_ir::ClbitId(i)
    }

    fn qubit(i: u32) -> qbench_ir::QubitId {
        qbench_ir::QubitId(i)
    }

    #[test]
    fn test_measurement_map_permuted() {
        let mut circuit = Circuit::with_size("swapped", 2, 2);
        circuit
            .x(qubit(0))
            .unwrap()
            .measure(qubit(0), clbit(1))
            .unwrap()
            .measure(qubit(1), clbit(0))
            .unwrap();
        let map = MeasurementMap::of(&circuit);
        assert_eq!(map, MeasurementMap::from_sources(vec![Some(1), Some(0)]));

        // q0 = 1 lands in c1, the leftmost classical bit.
        let dist = distribution_from_statevector(&[c(0.0), c(1.0), c(0.0), c(0.0)]).unwrap();
        let projected = map.project(&dist);
        assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["10"]);
    }

    #[test]
    fn test_measurement_map_sums_out_ancilla() {
        // Bell pair on q0, q1 with q2 left unmeasured but excited.
        let mut circuit = Circuit::with_size("ancilla", 3, 2);
        circuit
            .measure(qubit(0), clbit(0))
            .unwrap()
            .measure(qubit(1), clbit(1))
            .unwrap();
        let map = MeasurementMap::of(&circuit);

        let dist: Distribution = [("100".to_string(), 0.5), ("111".to_string(), 0.5)].into();
        let projected = map.project(&dist);
        assert_eq!(projected.len(), 2);
        assert!((projected["00"] - 0.5).abs() < 1e-12);
        assert!((projected["11"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_measurement_map_unwritten_clbit_reads_zero() {
        let mut circuit = Circuit::with_size("partial", 1, 2);
        circuit.measure(qubit(0), clbit(1)).unwrap();
        let projected = MeasurementMap::of(&circuit).project(&[("1".to_string(), 1.0)].into());
        assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["10"]);
    }

    #[test]
    fn test_measurement_map_without_measurements_is_identity() {
        let circuit = Circuit::with_size("bare", 2, 0);
        let map = MeasurementMap::of(&circuit);
        assert_eq!(map.num_clbits(), 2);
        let dist: Distribution = [("01".to_string(), 0.25), ("10".to_string(), 0.75)].into();
        assert_eq!(map.project(&dist), dist);
    }

    #[test]
    fn test_normalize_projects_statevector() {
        let map = MeasurementMap::from_sources(vec![Some(1), Some(0)]);
        let record = normalize(
            "statevector",
            BackendKind::Simulator,
            &metrics(),
            Some(&map),
            Ok(RawRun::Completed(RawOutcome::Statevector(vec![
                c(0.0),
                c(1.0),
                c(0.0),
                c(0.0),
            ]))),
        );
        assert_eq!(
            record.distribution().unwrap().keys().collect::<Vec<_>>(),
            vec!["10"]
        );
    }

    #[test]
    fn test_normalize_queued() {
        let record = normalize(
            "quantinuum",
            BackendKind::Hardware,
            &metrics(),
            None,
            Ok(RawRun::Queued(JobId::new("job-9"))),
        );
        assert_eq!(record.job_id(), Some("job-9"));
        assert_eq!(record.fidelity, None);
    }
}
