//! **Twin embedding encoder**
//!
//! One parametric function mapping a fixed-length mono frame to a
//! 128-dim embedding. "Twin" is an invocation pattern, not a structure:
//! the same [`TwinEncoder`] (hence the same `VarMap` parameter set) is
//! called once per arm of a pair, so gradients from both arms accumulate
//! into a single set of weights. Two parameter sets would make this a
//! pair of unrelated classifiers instead of a similarity learner.

use candle_core::{DType, Device, Tensor};
use candle_nn::{Conv1d, Conv1dConfig, Dropout, Linear, Module, VarBuilder, VarMap};

use crate::constants::{
    CONV1_CHANNELS, CONV2_CHANNELS, CONV_KERNEL, DROPOUT_P, EMBEDDING_DIM, HIDDEN_DIM,
    POOL_FACTOR, TARGET_SAMPLES,
};
use crate::error::Result;

/// Architecture hyper-parameters.
///
/// The defaults are the production shape; tests shrink `input_len` to keep
/// the first fully-connected layer small.
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    /// Samples per input frame. Every waveform entering the encoder must
    /// have exactly this length.
    pub input_len: usize,
    pub conv1_channels: usize,
    pub conv2_channels: usize,
    pub kernel: usize,
    pub pool: usize,
    pub hidden_dim: usize,
    pub embedding_dim: usize,
    pub dropout_p: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            input_len: TARGET_SAMPLES,
            conv1_channels: CONV1_CHANNELS,
            conv2_channels: CONV2_CHANNELS,
            kernel: CONV_KERNEL,
            pool: POOL_FACTOR,
            hidden_dim: HIDDEN_DIM,
            embedding_dim: EMBEDDING_DIM,
            dropout_p: DROPOUT_P,
        }
    }
}

impl EncoderConfig {
    /// Temporal length after one conv (valid padding, stride 1) + pool stage.
    const fn stage_len(&self, input_len: usize) -> usize {
        (input_len - (self.kernel - 1)) / self.pool
    }

    /// Flattened feature width entering the first fully-connected layer,
    /// fixed at construction from the frame length. A probe forward pass
    /// cross-checks this formula in the test suite only.
    pub const fn flattened_width(&self) -> usize {
        self.conv2_channels * self.stage_len(self.stage_len(self.input_len))
    }
}

pub struct TwinEncoder {
    conv1: Conv1d,
    conv2: Conv1d,
    fc1: Linear,
    fc2: Linear,
    dropout: Dropout,
    pool: usize,
}

impl TwinEncoder {
    /// Build the network under `vb`'s namespace.
    pub fn new(cfg: &EncoderConfig, vb: VarBuilder) -> Result<Self> {
        let conv_cfg = Conv1dConfig::default();
        let conv1 = candle_nn::conv1d(1, cfg.conv1_channels, cfg.kernel, conv_cfg, vb.pp("conv1"))?;
        let conv2 = candle_nn::conv1d(
            cfg.conv1_channels,
            cfg.conv2_channels,
            cfg.kernel,
            conv_cfg,
            vb.pp("conv2"),
        )?;
        let fc1 = candle_nn::linear(cfg.flattened_width(), cfg.hidden_dim, vb.pp("fc1"))?;
        let fc2 = candle_nn::linear(cfg.hidden_dim, cfg.embedding_dim, vb.pp("fc2"))?;

        Ok(Self {
            conv1,
            conv2,
            fc1,
            fc2,
            dropout: Dropout::new(cfg.dropout_p),
            pool: cfg.pool,
        })
    }

    /// Build a fresh parameter set and an encoder over it.
    pub fn build(cfg: &EncoderConfig, device: &Device) -> Result<(VarMap, Self)> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let encoder = Self::new(cfg, vb)?;
        Ok((varmap, encoder))
    }

    /// Embed a `(batch, 1, input_len)` frame batch into
    /// `(batch, embedding_dim)`. Dropout fires only when `train` is set;
    /// with `train = false` the output is deterministic in the input and
    /// parameters. The final layer carries no activation.
    pub fn forward(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let xs = max_pool1d(&self.conv1.forward(xs)?.relu()?, self.pool)?;
        let xs = max_pool1d(&self.conv2.forward(&xs)?.relu()?, self.pool)?;
        let xs = xs.flatten_from(1)?;
        let xs = self.fc1.forward(&xs)?.relu()?;
        let xs = self.dropout.forward(&xs, train)?;
        Ok(self.fc2.forward(&xs)?)
    }

    /// Conv/pool front-end only; exposed for the width probe in tests.
    pub fn conv_stack(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = max_pool1d(&self.conv1.forward(xs)?.relu()?, self.pool)?;
        max_pool1d(&self.conv2.forward(&xs)?.relu()?, self.pool)
    }
}

/// 1-D max-pool over the trailing (time) dimension of a `(B, C, L)` tensor.
fn max_pool1d(xs: &Tensor, factor: usize) -> Result<Tensor> {
    Ok(xs
        .unsqueeze(2)?
        .max_pool2d((1, factor))?
        .squeeze(2)?)
}

/// Stack per-clip frames into the `(batch, 1, input_len)` tensor the
/// encoder consumes.
pub fn waveform_batch(frames: &[Vec<f32>], device: &Device) -> Result<Tensor> {
    let mut rows = Vec::with_capacity(frames.len());
    for frame in frames {
        rows.push(Tensor::from_slice(frame, (1, frame.len()), device)?);
    }
    Ok(Tensor::stack(&rows, 0)?)
}
