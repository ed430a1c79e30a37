//! Command line interface for the echotwin verifier.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spoken-word verification: train, calibrate, verify.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the twin encoder on a directory of labelled clips
    Train(TrainCommand),

    /// Sweep verification thresholds over a held-out set
    Calibrate(CalibrateCommand),

    /// Compare two clips at a fixed threshold
    Verify(VerifyCommand),
}

/// Train the twin encoder
#[derive(Parser, Debug)]
pub struct TrainCommand {
    /// Directory containing {label}.wav clips
    #[arg(short, long)]
    pub audio_dir: PathBuf,

    /// CSV manifest listing the training labels
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Manifest column holding the labels
    #[arg(long, default_value = "word")]
    pub column: String,

    /// Output path for the best-validation checkpoint
    #[arg(short, long, default_value = "best_model.safetensors")]
    pub output: PathBuf,

    /// Learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub learning_rate: f64,

    /// Number of training epochs
    #[arg(short, long, default_value_t = 10)]
    pub epochs: usize,

    /// Batch size
    #[arg(short, long, default_value_t = 4)]
    pub batch_size: usize,

    /// Non-improving validation epochs tolerated before stopping
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Fraction of pairs used for training; the rest validate
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f32,

    /// Seed for pair construction and the split (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Sweep verification thresholds
#[derive(Parser, Debug)]
pub struct CalibrateCommand {
    /// Directory containing {label}.wav test clips
    #[arg(short, long)]
    pub audio_dir: PathBuf,

    /// Optional CSV manifest; without it labels come from the clip files
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Manifest column holding the labels
    #[arg(long, default_value = "word")]
    pub column: String,

    /// Trained checkpoint to evaluate
    #[arg(short, long)]
    pub checkpoint: PathBuf,

    /// Build balanced pairs instead of random draws
    #[arg(long)]
    pub balanced: bool,

    /// Random pair draws when not balanced. Positive-pair frequency is
    /// roughly 1/N for N labels, so keep this generous.
    #[arg(long, default_value_t = 200)]
    pub draws: usize,

    /// Batch size
    #[arg(short, long, default_value_t = 4)]
    pub batch_size: usize,

    /// Write the full report (scores + table) as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Seed for pair construction (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Compare two clips
#[derive(Parser, Debug)]
pub struct VerifyCommand {
    /// Trained checkpoint
    #[arg(short, long)]
    pub checkpoint: PathBuf,

    /// Distance cutoff, normally taken from a calibration run
    #[arg(short, long)]
    pub threshold: f32,

    /// First clip
    pub left: PathBuf,

    /// Second clip
    pub right: PathBuf,
}
