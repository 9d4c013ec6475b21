//! Hellinger fidelity between measurement distributions.

use crate::record::Distribution;

/// Fidelity `(Σ_k sqrt(P[k]·Q[k]))²` over the union of keys, clamped to
/// `[0, 1]`. Keys missing from one side count as probability 0, so only the
/// shared keys contribute.
pub fn fidelity(p: &Distribution, q: &Distribution) -> f64 {
    // Iterate the smaller map; the sum is symmetric in P and Q.
    let (small, large) = if p.len() <= q.len() { (p, q) } else { (q, p) };
    let overlap: f64 = small
        .iter()
        .filter_map(|(k, a)| large.get(k).map(|b| (a * b).sqrt()))
        .sum();
    (overlap * overlap).clamp(0.0, 1.0)
}

/// Score a candidate against the baseline.
///
/// `None` when the baseline or candidate is missing, or the candidate is
/// empty: there is nothing real to compare.
pub fn compare(baseline: Option<&Distribution>, candidate: Option<&Distribution>) -> Option<f64> {
    match (baseline, candidate) {
        (Some(p), Some(q)) if !p.is_empty() && !q.is_empty() => Some(fidelity(p, q)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(entries: &[(&str, f64)]) -> Distribution {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_self_fidelity() {
        let p = dist(&[("00", 0.5), ("11", 0.5)]);
        assert!((fidelity(&p, &p) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_support() {
        let p = dist(&[("00", 1.0)]);
        let q = dist(&[("11", 0.5), ("01", 0.5)]);
        assert_eq!(fidelity(&p, &q), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let p = dist(&[("0", 1.0)]);
        let q = dist(&[("0", 0.5), ("1", 0.5)]);
        assert!((fidelity(&p, &q) - 0.5).abs() < 1e-12);
        assert_eq!(fidelity(&p, &q), fidelity(&q, &p));
    }

    #[test]
    fn test_clamped_above_one() {
        // Unnormalized input must still land in [0, 1].
        let p = dist(&[("0", 2.0)]);
        assert_eq!(fidelity(&p, &p), 1.0);
    }

    #[test]
    fn test_compare_absent_inputs() {
        let p = dist(&[("0", 1.0)]);
        let empty = Distribution::new();
        assert_eq!(compare(None, Some(&p)), None);
        assert_eq!(compare(Some(&p), None), None);
        assert_eq!(compare(Some(&p), Some(&empty)), None);
        assert_eq!(compare(Some(&p), Some(&p)), Some(1.0));
    }
}
