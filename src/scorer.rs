//! Distance-threshold verification.
//!
//! The scorer is the inference-time decision rule: an embedding distance
//! and a calibrated cutoff in, a same/different verdict out. The cutoff
//! is **not** part of the model parameters — it is chosen empirically by
//! the calibrator and must be re-derived whenever the encoder is
//! retrained.

/// Euclidean (L2) distance between two plain embedding vectors.
pub fn embedding_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Converts a continuous distance into a binary same/different decision.
#[derive(Debug, Clone, Copy)]
pub struct VerificationScorer {
    threshold: f32,
}

impl VerificationScorer {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Match iff `distance < threshold`, strictly. A distance exactly at
    /// the cutoff is a *different* verdict.
    pub fn is_match(&self, distance: f32) -> bool {
        distance < self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_l2() {
        let d = embedding_distance(&[0.0, 3.0], &[4.0, 0.0]);
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn zero_distance_for_identical_embeddings() {
        let e = [0.25, -1.5, 3.0];
        assert_eq!(embedding_distance(&e, &e), 0.0);
    }

    #[test]
    fn decision_boundary_is_strict() {
        let scorer = VerificationScorer::new(0.5);
        assert!(scorer.is_match(0.4999));
        assert!(!scorer.is_match(0.5));
        assert!(!scorer.is_match(0.6));
    }

    #[test]
    fn raising_the_threshold_never_unmatches() {
        // Monotonicity: once a distance matches at threshold t, it matches
        // at every t' > t.
        let distances = [0.0, 0.01, 0.3, 0.5, 2.0];
        let sweep: Vec<f32> = (0..40).map(|i| i as f32 * 0.05).collect();
        for &d in &distances {
            let mut seen_match = false;
            for &t in &sweep {
                let decision = VerificationScorer::new(t).is_match(d);
                assert!(decision || !seen_match, "decision flipped back at t={t}");
                seen_match |= decision;
            }
        }
    }
}
