//! Margin-based contrastive objective over pair distances.
//!
//! Flag convention, used consistently by the sampler, the scorer and this
//! loss: **1.0 means the two clips carry the same word**. Matched pairs
//! are pulled together with a quadratic penalty on their distance;
//! mismatched pairs are pushed apart only until they clear the unit
//! margin, after which they stop contributing.

use candle_core::Tensor;

use crate::constants::CONTRASTIVE_MARGIN;
use crate::error::Result;

/// Row-wise Euclidean (L2) distance between two `(batch, dim)` embedding
/// batches; output shape `(batch,)`.
pub fn pairwise_distance(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    Ok((a - b)?.sqr()?.sum(1)?.sqrt()?)
}

/// Mean contrastive loss for an embedding-pair batch.
///
/// With distance `d` and flag `m` per pair:
/// `m * d^2 + (1 - m) * max(0, margin - d)^2`, averaged over the batch.
/// Zero for a perfectly collapsed matched pair; `margin^2` for a fully
/// collapsed mismatched pair; zero again once a mismatched pair clears
/// the margin.
pub fn contrastive_loss(a: &Tensor, b: &Tensor, flags: &Tensor) -> Result<Tensor> {
    let d2 = (a - b)?.sqr()?.sum(1)?;
    let d = d2.sqrt()?;

    let clamped = d.affine(-1.0, CONTRASTIVE_MARGIN)?.relu()?;
    let pull = (flags * &d2)?;
    let push = (flags.affine(-1.0, 1.0)? * clamped.sqr()?)?;
    Ok((pull + push)?.mean_all()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{Device, Tensor};

    fn row(values: &[f32], dev: &Device) -> Tensor {
        Tensor::from_slice(values, (1, values.len()), dev).expect("tensor")
    }

    fn scalar_loss(a: &[f32], b: &[f32], flag: f32) -> f32 {
        let dev = Device::Cpu;
        let loss = contrastive_loss(
            &row(a, &dev),
            &row(b, &dev),
            &Tensor::from_slice(&[flag], (1,), &dev).expect("flags"),
        )
        .expect("loss");
        loss.to_scalar::<f32>().expect("scalar")
    }

    #[test]
    fn collapsed_matched_pair_costs_nothing() {
        assert!(scalar_loss(&[0.5, -0.5], &[0.5, -0.5], 1.0).abs() < 1e-6);
    }

    #[test]
    fn collapsed_mismatched_pair_costs_squared_margin() {
        let loss = scalar_loss(&[0.5, -0.5], &[0.5, -0.5], 0.0);
        assert!((loss - 1.0).abs() < 1e-6);
    }

    #[test]
    fn matched_pair_pays_squared_distance() {
        // d = 2 → m·d² = 4
        let loss = scalar_loss(&[0.0, 0.0], &[2.0, 0.0], 1.0);
        assert!((loss - 4.0).abs() < 1e-5);
    }

    #[test]
    fn mismatched_pair_beyond_margin_is_free() {
        let loss = scalar_loss(&[0.0, 0.0], &[2.0, 0.0], 0.0);
        assert!(loss.abs() < 1e-6);
    }

    #[test]
    fn loss_is_non_negative_over_a_grid() {
        for d in [0.0f32, 0.25, 0.5, 1.0, 3.0] {
            for flag in [0.0f32, 1.0] {
                let loss = scalar_loss(&[0.0, 0.0], &[d, 0.0], flag);
                assert!(loss >= 0.0, "loss({d}, {flag}) = {loss}");
            }
        }
    }

    #[test]
    fn distance_matches_hand_computation() {
        let dev = Device::Cpu;
        let d = pairwise_distance(&row(&[0.0, 3.0], &dev), &row(&[4.0, 0.0], &dev))
            .expect("distance");
        let d = d.to_vec1::<f32>().expect("vec");
        assert!((d[0] - 5.0).abs() < 1e-6);
    }
}
