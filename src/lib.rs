//! Echotwin – public crate root
//! ============================
//! **Spoken-word verification**: decide whether two audio clips carry the
//! same word, using a twin (shared-weight) Candle encoder trained with a
//! margin-based contrastive objective.
//!
//! The pipeline, leaf-first:
//!
//! * [`audio`] — WAV decode, mono downmix, fixed-length framing.
//! * [`pairs`] — balanced or random (label, label, matched) construction.
//! * [`model`] — the twin encoder, the contrastive loss, checkpoint I/O.
//! * [`scorer`] — Euclidean distance + strict threshold decision.
//! * [`trainer`] — mini-batch AdamW loop with validation tracking,
//!   best-checkpoint persistence and patience-based early stopping.
//! * [`calibrate`] — score a held-out set once, sweep many thresholds,
//!   report accuracy per operating point.
//!
//! One parameter set exists per model instance; both arms of every pair
//! are embedded by the same [`model::TwinEncoder`]. Distances are only
//! comparable against a threshold calibrated for the same parameters —
//! retrain the encoder, re-run the calibrator.

#![deny(unsafe_code)]

/* ────────────────────────  sub-modules  ─────────────────────────────── */
pub mod audio;
pub mod calibrate;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod manifest;
pub mod model;
pub mod pairs;
pub mod scorer;
pub mod trainer;

/* ────────── public façade & re-exports ─────────────────────────────── */
pub use audio::WavLoader;
pub use calibrate::{CalibrationPoint, CalibrationReport};
pub use constants::*;
pub use dataset::{AudioStore, PairBatch};
pub use error::{Error, Result};
pub use model::{
    EncoderConfig, TwinEncoder, contrastive_loss, load_checkpoint, pairwise_distance,
    save_checkpoint, waveform_batch,
};
pub use pairs::{Pair, balanced_pairs, random_pairs};
pub use scorer::{VerificationScorer, embedding_distance};
pub use trainer::{
    EarlyStopping, EpochStats, TrainOptions, TrainingSummary, Verdict, evaluate, split_pairs,
    train,
};
