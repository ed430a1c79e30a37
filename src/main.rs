//! echotwin CLI binary
//! Spoken-word verification with a twin Candle encoder

use anyhow::{Context, Result};
use candle_core::Device;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

mod cli;
use cli::{Cli, Commands};

use echotwin::audio::WavLoader;
use echotwin::dataset::AudioStore;
use echotwin::model::{
    EncoderConfig, TwinEncoder, load_checkpoint, pairwise_distance, waveform_batch,
};
use echotwin::scorer::VerificationScorer;
use echotwin::trainer::TrainOptions;
use echotwin::{calibrate, manifest, pairs, trainer};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train(cmd) => train(cmd),
        Commands::Calibrate(cmd) => run_calibration(cmd),
        Commands::Verify(cmd) => verify(cmd),
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn train(cmd: cli::TrainCommand) -> Result<()> {
    let device = Device::Cpu;
    let mut rng = rng_from(cmd.seed);

    let labels = manifest::load_labels(&cmd.manifest, &cmd.column)?;
    info!("{} labels from {}", labels.len(), cmd.manifest.display());

    let all_pairs = pairs::balanced_pairs(&labels, &mut rng)?;
    let (train_pairs, val_pairs) = trainer::split_pairs(all_pairs, cmd.train_fraction, &mut rng);
    info!(
        "{} training pairs, {} validation pairs",
        train_pairs.len(),
        val_pairs.len()
    );

    let store = AudioStore::new(&cmd.audio_dir, WavLoader::default());
    let (mut varmap, encoder) = TwinEncoder::build(&EncoderConfig::default(), &device)?;

    let opts = TrainOptions {
        lr: cmd.learning_rate,
        epochs: cmd.epochs,
        batch_size: cmd.batch_size,
        patience: cmd.patience,
        checkpoint: cmd.output.clone(),
    };
    let summary = match trainer::train(
        &encoder,
        &varmap,
        &store,
        &train_pairs,
        &val_pairs,
        &opts,
        &device,
        &mut rng,
    ) {
        Ok(summary) => summary,
        Err(err) => {
            // The run is over, but the last good epoch's parameters are
            // still on disk and the run can resume from them.
            error!(
                "training aborted: {err}; last checkpoint (if any) at {}",
                cmd.output.display()
            );
            return Err(err.into());
        }
    };

    // The in-memory parameters may postdate the best epoch; downstream
    // inference should see the checkpointed state.
    load_checkpoint(&mut varmap, &cmd.output)?;

    info!(
        "trained {} epochs{}; best validation loss {:.6}; checkpoint {}",
        summary.epochs_run,
        if summary.stopped_early {
            " (stopped early)"
        } else {
            ""
        },
        summary.best_val_loss,
        cmd.output.display()
    );
    Ok(())
}

fn run_calibration(cmd: cli::CalibrateCommand) -> Result<()> {
    let device = Device::Cpu;
    let mut rng = rng_from(cmd.seed);

    let labels = match &cmd.manifest {
        Some(path) => manifest::load_labels(path, &cmd.column)?,
        None => manifest::labels_from_dir(&cmd.audio_dir)?,
    };
    info!("{} labels available for calibration", labels.len());

    let test_pairs = if cmd.balanced {
        pairs::balanced_pairs(&labels, &mut rng)?
    } else {
        pairs::random_pairs(&labels, cmd.draws, &mut rng)
    };
    let positives = test_pairs.iter().filter(|p| p.matched).count();
    info!(
        "{} test pairs ({} positive, {} negative)",
        test_pairs.len(),
        positives,
        test_pairs.len() - positives
    );

    let store = AudioStore::new(&cmd.audio_dir, WavLoader::default());
    let (mut varmap, encoder) = TwinEncoder::build(&EncoderConfig::default(), &device)?;
    load_checkpoint(&mut varmap, &cmd.checkpoint)?;

    let report = calibrate::calibrate(
        &encoder,
        &store,
        &test_pairs,
        &calibrate::default_sweep(),
        cmd.batch_size,
        &device,
    )?;

    for point in &report.points {
        println!(
            "threshold {:.4}  accuracy {:6.2}%",
            point.threshold,
            point.accuracy * 100.0
        );
    }
    if let Some(best) = report.best() {
        println!(
            "best operating point: threshold {:.4} at {:.2}% accuracy",
            best.threshold,
            best.accuracy * 100.0
        );
    }

    if let Some(path) = &cmd.report {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating report {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        info!("report written to {}", path.display());
    }
    Ok(())
}

fn verify(cmd: cli::VerifyCommand) -> Result<()> {
    let device = Device::Cpu;

    let (mut varmap, encoder) = TwinEncoder::build(&EncoderConfig::default(), &device)?;
    load_checkpoint(&mut varmap, &cmd.checkpoint)?;

    let loader = WavLoader::default();
    let left = loader.load(&cmd.left)?;
    let right = loader.load(&cmd.right)?;

    let lhs = encoder.forward(&waveform_batch(&[left], &device)?, false)?;
    let rhs = encoder.forward(&waveform_batch(&[right], &device)?, false)?;
    let distance = pairwise_distance(&lhs, &rhs)?
        .to_vec1::<f32>()?
        .first()
        .copied()
        .context("empty distance batch")?;

    let scorer = VerificationScorer::new(cmd.threshold);
    println!("distance  {distance:.6}");
    println!("threshold {:.6}", scorer.threshold());
    println!(
        "verdict   {}",
        if scorer.is_match(distance) {
            "same word"
        } else {
            "different words"
        }
    );
    Ok(())
}
