//! Crate-wide error taxonomy.
//!
//! Every stage of the pipeline surfaces its failures here; nothing is
//! silently suppressed. File-level read errors abort the batch or run
//! depending on the caller, the rest are fatal.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Source clip missing or undecodable. Never retried.
    #[error("media read {path}: {source}")]
    MediaRead {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Negative-pair construction needs at least two distinct labels.
    #[error("need at least 2 distinct labels for negative pairs, got {0}")]
    InsufficientLabels(usize),

    /// A waveform left the normalizer at the wrong length. Internal
    /// invariant violation; unreachable through the public loader.
    #[error("normalized waveform has {got} samples, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Failed to persist or restore encoder parameters. Fatal for the
    /// current run; the last good checkpoint on disk remains usable.
    #[error("checkpoint {path}: {source}")]
    CheckpointIo {
        path: PathBuf,
        #[source]
        source: candle_core::Error,
    },

    /// Label manifest could not be read or lacks the requested column.
    #[error("manifest: {0}")]
    Manifest(String),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("candle: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the public API.
pub type Result<T> = std::result::Result<T, Error>;
