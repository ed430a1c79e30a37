//! Encoder network, contrastive objective and parameter checkpointing.

mod encoder;
mod loss;

pub use encoder::{EncoderConfig, TwinEncoder, waveform_batch};
pub use loss::{contrastive_loss, pairwise_distance};

use std::path::Path;

use candle_nn::VarMap;

use crate::error::{Error, Result};

/// Persist the full parameter set as a safetensors blob.
///
/// The blob round-trips exactly: [`load_checkpoint`] into an identically
/// shaped [`VarMap`] reproduces every tensor bit-for-bit.
pub fn save_checkpoint(varmap: &VarMap, path: &Path) -> Result<()> {
    varmap.save(path).map_err(|source| Error::CheckpointIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Restore a parameter set previously written by [`save_checkpoint`].
///
/// The map must already hold variables of the checkpoint's names and
/// shapes, i.e. the encoder is built first and its weights overwritten.
pub fn load_checkpoint(varmap: &mut VarMap, path: &Path) -> Result<()> {
    varmap.load(path).map_err(|source| Error::CheckpointIo {
        path: path.to_path_buf(),
        source,
    })
}
