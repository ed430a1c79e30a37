//! Contrastive training loop.
//!
//! Mini-batch AdamW over the encoder's single shared parameter set: one
//! forward per arm, both gradients accumulate before the step. Each epoch
//! runs every training batch with updates, then every validation batch
//! with dropout off and no updates, and reports both mean losses. The
//! best-validation parameter set is persisted on every improvement, and a
//! patience counter ends the run once validation stops moving.
//!
//! The stopping/checkpoint bookkeeping lives in [`EarlyStopping`], plain
//! local state threaded through the loop, so the trainer stays re-entrant
//! and the policy is testable without a network.

use std::path::PathBuf;

use candle_core::Device;
use candle_nn::Optimizer;
use candle_nn::optim::{AdamW, ParamsAdamW};
use candle_nn::VarMap;
use log::info;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::dataset::AudioStore;
use crate::error::Result;
use crate::model::{TwinEncoder, contrastive_loss, save_checkpoint};
use crate::pairs::Pair;

/// Hyper-parameters accepted by the trainer.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// AdamW learning rate.
    pub lr: f64,
    /// Epoch budget; the patience rule may stop the run sooner.
    pub epochs: usize,
    /// Pairs per mini-batch.
    pub batch_size: usize,
    /// Non-improving validation epochs tolerated before stopping.
    pub patience: usize,
    /// Where the best parameter set is persisted.
    pub checkpoint: PathBuf,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            lr: 1e-4,
            epochs: 10,
            batch_size: 4,
            patience: 3,
            checkpoint: PathBuf::from("best_model.safetensors"),
        }
    }
}

/// Mean losses of one completed epoch.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub train_loss: f32,
    pub val_loss: f32,
}

/// What a finished run looked like. The checkpoint on disk holds the
/// best-validation parameters, which may be older than the in-memory
/// parameter set; the caller decides whether to reload it.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub epochs_run: usize,
    pub best_val_loss: f32,
    pub stopped_early: bool,
    pub history: Vec<EpochStats>,
}

/// Outcome of feeding one validation loss to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// New best validation loss; checkpoint now.
    Improved,
    /// No improvement, patience not yet exhausted.
    Stale,
    /// Patience exhausted; stop training.
    Halt,
}

/// Best-loss tracker and patience counter, threaded through the epoch
/// loop rather than kept as module state.
#[derive(Debug, Clone, Copy)]
pub struct EarlyStopping {
    best: f32,
    stale: usize,
    patience: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            best: f32::INFINITY,
            stale: 0,
            patience,
        }
    }

    /// Best validation loss seen so far.
    pub fn best(&self) -> f32 {
        self.best
    }

    pub fn observe(&mut self, val_loss: f32) -> Verdict {
        if val_loss < self.best {
            self.best = val_loss;
            self.stale = 0;
            Verdict::Improved
        } else {
            self.stale += 1;
            if self.stale >= self.patience {
                Verdict::Halt
            } else {
                Verdict::Stale
            }
        }
    }
}

/// Shuffle `pairs` and split off a training fraction (the remainder is
/// validation).
pub fn split_pairs<R: Rng + ?Sized>(
    mut pairs: Vec<Pair>,
    train_fraction: f32,
    rng: &mut R,
) -> (Vec<Pair>, Vec<Pair>) {
    pairs.shuffle(rng);
    let n_train = (pairs.len() as f32 * train_fraction) as usize;
    let val = pairs.split_off(n_train.min(pairs.len()));
    (pairs, val)
}

/// Run the full training loop, mutating the parameters behind `varmap`
/// (which must be the map `encoder` was built from).
pub fn train<R: Rng + ?Sized>(
    encoder: &TwinEncoder,
    varmap: &VarMap,
    store: &AudioStore,
    train_pairs: &[Pair],
    val_pairs: &[Pair],
    opts: &TrainOptions,
    device: &Device,
    rng: &mut R,
) -> Result<TrainingSummary> {
    let params = ParamsAdamW {
        lr: opts.lr,
        ..Default::default()
    };
    let mut opt = AdamW::new(varmap.all_vars(), params)?;

    let mut stopper = EarlyStopping::new(opts.patience);
    let mut history = Vec::with_capacity(opts.epochs);
    let mut order: Vec<usize> = (0..train_pairs.len()).collect();
    let mut stopped_early = false;
    let mut checkpointed = false;

    for epoch in 1..=opts.epochs {
        order.shuffle(rng);

        let mut total = 0f32;
        let mut batches = 0usize;
        for chunk in order.chunks(opts.batch_size.max(1)) {
            let picked: Vec<Pair> = chunk.iter().map(|&i| train_pairs[i].clone()).collect();
            let batch = store.pair_batch(&picked, device)?;

            let lhs = encoder.forward(&batch.a, true)?;
            let rhs = encoder.forward(&batch.b, true)?;
            let loss = contrastive_loss(&lhs, &rhs, &batch.flags)?;
            opt.backward_step(&loss)?;

            total += f32::try_from(&loss)?;
            batches += 1;
        }
        let train_loss = total / batches.max(1) as f32;

        let val_loss = evaluate(encoder, store, val_pairs, opts.batch_size, device)?;
        info!(
            "epoch {epoch}/{} train_loss={train_loss:.6} val_loss={val_loss:.6}",
            opts.epochs
        );
        history.push(EpochStats {
            epoch,
            train_loss,
            val_loss,
        });

        match stopper.observe(val_loss) {
            Verdict::Improved => {
                save_checkpoint(varmap, &opts.checkpoint)?;
                checkpointed = true;
            }
            Verdict::Stale => {}
            Verdict::Halt => {
                info!("early stop after {epoch} epochs (patience {})", opts.patience);
                stopped_early = true;
                break;
            }
        }
    }

    // A run whose validation loss never came down (e.g. all-NaN) still
    // leaves a usable parameter set on disk.
    if !checkpointed {
        save_checkpoint(varmap, &opts.checkpoint)?;
    }

    Ok(TrainingSummary {
        epochs_run: history.len(),
        best_val_loss: stopper.best(),
        stopped_early,
        history,
    })
}

/// Mean contrastive loss of `pairs` with dropout off and no updates.
pub fn evaluate(
    encoder: &TwinEncoder,
    store: &AudioStore,
    pairs: &[Pair],
    batch_size: usize,
    device: &Device,
) -> Result<f32> {
    let mut total = 0f32;
    let mut batches = 0usize;
    for chunk in pairs.chunks(batch_size.max(1)) {
        let batch = store.pair_batch(chunk, device)?;
        let lhs = encoder.forward(&batch.a, false)?;
        let rhs = encoder.forward(&batch.b, false)?;
        let loss = contrastive_loss(&lhs, &rhs, &batch.flags)?;
        total += f32::try_from(&loss)?;
        batches += 1;
    }
    Ok(total / batches.max(1) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn improving_sequence_never_halts() {
        let mut stopper = EarlyStopping::new(3);
        for (i, loss) in [0.9f32, 0.8, 0.7, 0.6, 0.5].iter().enumerate() {
            assert_eq!(stopper.observe(*loss), Verdict::Improved, "epoch {i}");
        }
        assert!((stopper.best() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn halts_exactly_patience_epochs_after_last_improvement() {
        // Improvement stops after epoch 2; patience 3 → halt at epoch 5.
        let mut stopper = EarlyStopping::new(3);
        assert_eq!(stopper.observe(0.9), Verdict::Improved);
        assert_eq!(stopper.observe(0.8), Verdict::Improved);
        assert_eq!(stopper.observe(0.85), Verdict::Stale);
        assert_eq!(stopper.observe(0.81), Verdict::Stale);
        assert_eq!(stopper.observe(0.8), Verdict::Halt);
    }

    #[test]
    fn equal_loss_counts_as_stale() {
        let mut stopper = EarlyStopping::new(2);
        assert_eq!(stopper.observe(0.5), Verdict::Improved);
        assert_eq!(stopper.observe(0.5), Verdict::Stale);
        assert_eq!(stopper.observe(0.5), Verdict::Halt);
    }

    #[test]
    fn split_keeps_every_pair_exactly_once() {
        let pairs: Vec<Pair> = (0..10)
            .map(|i| Pair {
                a: format!("w{i}"),
                b: format!("w{i}"),
                matched: true,
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(11);
        let (train, val) = split_pairs(pairs.clone(), 0.8, &mut rng);

        assert_eq!(train.len(), 8);
        assert_eq!(val.len(), 2);
        let mut all: Vec<String> = train.iter().chain(&val).map(|p| p.a.clone()).collect();
        all.sort();
        let mut expected: Vec<String> = pairs.iter().map(|p| p.a.clone()).collect();
        expected.sort();
        assert_eq!(all, expected);
    }
}
