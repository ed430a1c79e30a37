//! Post-training threshold calibration.
//!
//! Embeddings are expensive and thresholds are cheap, so the sweep is
//! split in two: [`score_pairs`] runs the frozen encoder exactly once per
//! pair and keeps only distances and ground truth, then [`sweep`] replays
//! the decision rule over those fixed arrays for every candidate cutoff.
//! Every threshold is therefore judged on identical underlying scores.
//!
//! The resulting table is advisory; picking the operating threshold is a
//! configuration decision, not something this module hard-codes.

use candle_core::Device;
use log::info;
use serde::Serialize;

use crate::dataset::AudioStore;
use crate::error::Result;
use crate::model::{TwinEncoder, pairwise_distance};
use crate::pairs::Pair;
use crate::scorer::VerificationScorer;

/// Default operating grid: 0.01 to 0.10 in 0.01 steps.
pub fn default_sweep() -> Vec<f32> {
    (1..=10).map(|i| i as f32 / 100.0).collect()
}

/// Accuracy of the decision rule at one candidate threshold.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CalibrationPoint {
    pub threshold: f32,
    pub accuracy: f32,
}

/// Everything a calibration run produced: the per-pair scores it was
/// computed from and the accuracy table over the sweep.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub distances: Vec<f32>,
    pub matched: Vec<bool>,
    pub points: Vec<CalibrationPoint>,
}

impl CalibrationReport {
    /// Operating point with the highest accuracy, ties going to the
    /// smaller threshold.
    pub fn best(&self) -> Option<CalibrationPoint> {
        self.points.iter().copied().max_by(|a, b| {
            a.accuracy
                .total_cmp(&b.accuracy)
                .then(b.threshold.total_cmp(&a.threshold))
        })
    }
}

/// Embed every pair once with frozen parameters and return the distance
/// and match-flag arrays, batched to bound memory.
pub fn score_pairs(
    encoder: &TwinEncoder,
    store: &AudioStore,
    pairs: &[Pair],
    batch_size: usize,
    device: &Device,
) -> Result<(Vec<f32>, Vec<bool>)> {
    let mut distances = Vec::with_capacity(pairs.len());
    let mut matched = Vec::with_capacity(pairs.len());

    for chunk in pairs.chunks(batch_size.max(1)) {
        let batch = store.pair_batch(chunk, device)?;
        let lhs = encoder.forward(&batch.a, false)?;
        let rhs = encoder.forward(&batch.b, false)?;
        distances.extend(pairwise_distance(&lhs, &rhs)?.to_vec1::<f32>()?);
        matched.extend(chunk.iter().map(|p| p.matched));
    }
    Ok((distances, matched))
}

/// Accuracy per candidate threshold over fixed score arrays. Pure and
/// deterministic: the same arrays and sweep always yield the same table.
pub fn sweep(distances: &[f32], matched: &[bool], thresholds: &[f32]) -> Vec<CalibrationPoint> {
    if distances.is_empty() {
        return Vec::new();
    }
    thresholds
        .iter()
        .map(|&threshold| {
            let scorer = VerificationScorer::new(threshold);
            let correct = distances
                .iter()
                .zip(matched)
                .filter(|(d, m)| scorer.is_match(**d) == **m)
                .count();
            CalibrationPoint {
                threshold,
                accuracy: correct as f32 / distances.len() as f32,
            }
        })
        .collect()
}

/// Score, sweep and report in one pass.
pub fn calibrate(
    encoder: &TwinEncoder,
    store: &AudioStore,
    pairs: &[Pair],
    thresholds: &[f32],
    batch_size: usize,
    device: &Device,
) -> Result<CalibrationReport> {
    let (distances, matched) = score_pairs(encoder, store, pairs, batch_size, device)?;
    let points = sweep(&distances, &matched, thresholds);
    for point in &points {
        info!(
            "threshold={:.4} accuracy={:.2}%",
            point.threshold,
            point.accuracy * 100.0
        );
    }
    Ok(CalibrationReport {
        distances,
        matched,
        points,
    })
}
