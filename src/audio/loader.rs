//! **WAV → fixed-length mono frame**
//!
//! 1. Decode a WAV file (integer 8/16/24/32-bit or float) → interleaved `f32`.
//! 2. Downmix to mono by arithmetic mean across channels.
//! 3. Right-pad with zeros or truncate to the target sample count
//!    (no centering, no resampling).
//!
//! The transform is pure; a missing or corrupt file surfaces
//! [`Error::MediaRead`] straight away and is never retried.

use std::io::Read;
use std::path::Path;

use hound::{Sample as HoundSample, SampleFormat, WavReader};

use crate::constants::TARGET_SAMPLES;
use crate::error::{Error, Result};

/// Loads clips and normalizes them to a fixed mono frame.
#[derive(Debug, Clone, Copy)]
pub struct WavLoader {
    target_len: usize,
}

impl Default for WavLoader {
    fn default() -> Self {
        Self::new(TARGET_SAMPLES)
    }
}

impl WavLoader {
    /// Build a loader producing frames of exactly `target_len` samples.
    pub fn new(target_len: usize) -> Self {
        Self { target_len }
    }

    /// Frame length every loaded clip is reconciled to.
    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Load `path` and return a mono frame of exactly `target_len` samples.
    pub fn load(&self, path: &Path) -> Result<Vec<f32>> {
        let media_err = |source| Error::MediaRead {
            path: path.to_path_buf(),
            source,
        };

        let mut wav = WavReader::open(path).map_err(media_err)?;
        let spec = wav.spec();
        let channels = spec.channels as usize;

        let interleaved = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, _) => read_scaled::<_, f32>(&mut wav, 1.0),
            (SampleFormat::Int, bits @ 1..=8) => {
                read_scaled::<_, i8>(&mut wav, int_scale(bits))
            }
            (SampleFormat::Int, bits @ 9..=16) => {
                read_scaled::<_, i16>(&mut wav, int_scale(bits))
            }
            (SampleFormat::Int, bits) => read_scaled::<_, i32>(&mut wav, int_scale(bits)),
        }
        .map_err(media_err)?;

        let mono = downmix_to_mono(&interleaved, channels);
        let framed = frame_to_length(mono, self.target_len);

        // Unreachable through the branches above; kept as a hard invariant
        // because every consumer assumes the fixed frame shape.
        if framed.len() != self.target_len {
            return Err(Error::ShapeMismatch {
                expected: self.target_len,
                got: framed.len(),
            });
        }
        Ok(framed)
    }
}

/// Scale factor mapping a `bits`-wide signed integer onto [-1, 1).
fn int_scale(bits: u16) -> f32 {
    1.0 / (1i64 << (bits - 1)) as f32
}

/// Lossy widening of a decoded PCM sample to `f32`, before scaling.
trait ToF32 {
    fn to_f32(self) -> f32;
}

macro_rules! impl_to_f32 {
    ($($t:ty),*) => {
        $(impl ToF32 for $t {
            fn to_f32(self) -> f32 {
                self as f32
            }
        })*
    };
}

impl_to_f32!(i8, i16, i32, f32);

fn read_scaled<R, S>(wav: &mut WavReader<R>, scale: f32) -> hound::Result<Vec<f32>>
where
    R: Read,
    S: HoundSample + ToF32 + Copy,
{
    wav.samples::<S>()
        .map(|s| s.map(|v| v.to_f32() * scale))
        .collect()
}

/// Collapse interleaved multi-channel samples to mono via the per-frame
/// arithmetic mean. Mono input is returned unchanged.
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Reconcile `samples` to exactly `target_len`: truncate the tail if long,
/// right-pad with zeros if short.
pub fn frame_to_length(mut samples: Vec<f32>, target_len: usize) -> Vec<f32> {
    samples.truncate(target_len);
    samples.resize(target_len, 0.0);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_downmix_is_channel_mean() {
        let interleaved = [0.2, 0.4, -1.0, 1.0, 0.0, 0.5];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] - 0.0).abs() < 1e-6);
        assert!((mono[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn mono_passes_through_untouched() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn short_clip_is_right_padded() {
        let framed = frame_to_length(vec![1.0, 2.0], 5);
        assert_eq!(framed, vec![1.0, 2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn long_clip_keeps_its_head() {
        let framed = frame_to_length(vec![1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(framed, vec![1.0, 2.0]);
    }

    #[test]
    fn int_scale_matches_sample_width() {
        assert!((int_scale(16) - 1.0 / 32768.0).abs() < 1e-12);
        assert!((int_scale(8) - 1.0 / 128.0).abs() < 1e-12);
    }
}
