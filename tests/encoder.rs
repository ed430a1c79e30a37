//! Encoder shape, determinism and checkpoint round-trip checks.
//
//   cargo test --test encoder
//
// A shrunken frame length keeps the first fully-connected layer small;
// the architecture is otherwise the production one.

use anyhow::Result;
use candle_core::{DType, Device, Tensor};

use echotwin::model::{
    EncoderConfig, TwinEncoder, load_checkpoint, save_checkpoint, waveform_batch,
};

const FRAME: usize = 400;

fn tiny() -> EncoderConfig {
    EncoderConfig {
        input_len: FRAME,
        ..Default::default()
    }
}

#[test]
fn embedding_has_configured_width() -> Result<()> {
    let dev = Device::Cpu;
    let cfg = tiny();
    let (_varmap, encoder) = TwinEncoder::build(&cfg, &dev)?;

    let frames = Tensor::zeros((2, 1, cfg.input_len), DType::F32, &dev)?;
    let embeddings = encoder.forward(&frames, false)?;
    assert_eq!(embeddings.dims(), &[2, cfg.embedding_dim]);
    Ok(())
}

#[test]
fn static_width_matches_probe_pass() -> Result<()> {
    // The flattened width is a closed formula over the layer shapes; the
    // zero-probe forward pass survives only here as a cross-check.
    let dev = Device::Cpu;
    let cfg = tiny();
    let (_varmap, encoder) = TwinEncoder::build(&cfg, &dev)?;

    let probe = Tensor::zeros((1, 1, cfg.input_len), DType::F32, &dev)?;
    let features = encoder.conv_stack(&probe)?;
    assert_eq!(features.elem_count(), cfg.flattened_width());
    Ok(())
}

#[test]
fn eval_mode_is_deterministic() -> Result<()> {
    let dev = Device::Cpu;
    let cfg = tiny();
    let (_varmap, encoder) = TwinEncoder::build(&cfg, &dev)?;

    let clip: Vec<f32> = (0..FRAME).map(|i| ((i % 17) as f32 - 8.0) / 8.0).collect();
    let frames = waveform_batch(&[clip], &dev)?;

    let first = encoder.forward(&frames, false)?.to_vec2::<f32>()?;
    let second = encoder.forward(&frames, false)?.to_vec2::<f32>()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn checkpoint_roundtrip_reproduces_embeddings_exactly() -> Result<()> {
    let dev = Device::Cpu;
    let cfg = tiny();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("encoder.safetensors");

    let (varmap_a, encoder_a) = TwinEncoder::build(&cfg, &dev)?;
    save_checkpoint(&varmap_a, &path)?;

    // Fresh random parameters, then overwritten from disk.
    let (mut varmap_b, encoder_b) = TwinEncoder::build(&cfg, &dev)?;
    load_checkpoint(&mut varmap_b, &path)?;

    let frames = waveform_batch(&[vec![0.25; FRAME]], &dev)?;
    let from_a = encoder_a.forward(&frames, false)?.to_vec2::<f32>()?;
    let from_b = encoder_b.forward(&frames, false)?.to_vec2::<f32>()?;
    assert_eq!(from_a, from_b);
    Ok(())
}
