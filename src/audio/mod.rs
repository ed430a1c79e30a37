//! Waveform loading and normalization.
//!
//! Everything downstream of this module sees exactly one shape of audio:
//! a single mono channel of [`crate::constants::TARGET_SAMPLES`] `f32`
//! samples. The encoder never has to reason about channel counts or clip
//! durations.

mod loader;

pub use loader::{WavLoader, downmix_to_mono, frame_to_length};
