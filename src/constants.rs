/// VERIFIER_SAMPLE_RATE is the sample rate every source clip is assumed to carry.
pub const VERIFIER_SAMPLE_RATE: usize = 16_000;

/// TARGET_SAMPLES is the fixed mono frame length entering the encoder
/// (10 s at 16 kHz). Shorter clips are zero-padded, longer clips truncated.
pub const TARGET_SAMPLES: usize = 160_000;

/// CONV1_CHANNELS is the channel width after the first convolution stage.
pub const CONV1_CHANNELS: usize = 32;

/// CONV2_CHANNELS is the channel width after the second convolution stage.
pub const CONV2_CHANNELS: usize = 64;

/// CONV_KERNEL is the kernel size shared by both convolution stages
/// (valid padding, stride 1).
pub const CONV_KERNEL: usize = 5;

/// POOL_FACTOR is the downsampling factor of each max-pool stage.
pub const POOL_FACTOR: usize = 2;

/// HIDDEN_DIM is the width of the fully-connected projection ahead of the
/// embedding head.
pub const HIDDEN_DIM: usize = 256;

/// EMBEDDING_DIM is the output width of the encoder.
pub const EMBEDDING_DIM: usize = 128;

/// DROPOUT_P is the unit-drop probability applied between the two
/// fully-connected layers, active during training only.
pub const DROPOUT_P: f32 = 0.5;

/// CONTRASTIVE_MARGIN is the separation margin enforced on non-matching
/// pairs by the contrastive loss.
pub const CONTRASTIVE_MARGIN: f64 = 1.0;
