//! Label-keyed audio access and pair-batch materialization.
//!
//! An [`AudioStore`] maps a label to its clip (`{label}.wav` under one
//! directory) and turns a slice of [`Pair`]s into the tensors one training
//! or evaluation step consumes. Waveforms are loaded fresh per batch and
//! dropped after the forward pass; nothing is cached, because encoder
//! parameters move between steps.

use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};

use crate::audio::WavLoader;
use crate::error::Result;
use crate::model::waveform_batch;
use crate::pairs::Pair;

/// One mini-batch of materialized pairs: `(B, 1, L)` frames per arm and
/// the `(B,)` ground-truth flags (1.0 = same word).
pub struct PairBatch {
    pub a: Tensor,
    pub b: Tensor,
    pub flags: Tensor,
}

/// A directory of `{label}.wav` clips behind a fixed-frame loader.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
    loader: WavLoader,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>, loader: WavLoader) -> Self {
        Self {
            dir: dir.into(),
            loader,
        }
    }

    pub fn loader(&self) -> &WavLoader {
        &self.loader
    }

    /// Path of the clip backing `label`.
    pub fn clip_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.wav"))
    }

    /// Load and normalize the clip backing `label`.
    pub fn load_clip(&self, label: &str) -> Result<Vec<f32>> {
        self.loader.load(&self.clip_path(label))
    }

    /// Materialize a batch: every clip referenced by `pairs` is loaded,
    /// normalized and stacked. A missing or corrupt clip fails the whole
    /// batch; whether to abort the run or re-sample is the caller's call.
    pub fn pair_batch(&self, pairs: &[Pair], device: &Device) -> Result<PairBatch> {
        let mut lhs = Vec::with_capacity(pairs.len());
        let mut rhs = Vec::with_capacity(pairs.len());
        let mut flags = Vec::with_capacity(pairs.len());

        for pair in pairs {
            lhs.push(self.load_clip(&pair.a)?);
            rhs.push(self.load_clip(&pair.b)?);
            flags.push(if pair.matched { 1.0f32 } else { 0.0 });
        }

        Ok(PairBatch {
            a: waveform_batch(&lhs, device)?,
            b: waveform_batch(&rhs, device)?,
            flags: Tensor::from_slice(&flags, (flags.len(),), device)?,
        })
    }
}

/// Convenience constructor with the production frame length.
impl From<&Path> for AudioStore {
    fn from(dir: &Path) -> Self {
        Self::new(dir, WavLoader::default())
    }
}
