//! Command-line entry point: train, evaluate and run the digit classifier.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use digitnet::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "digitnet")]
#[command(about = "Feed-forward neural network trainer for MNIST digits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new network, report test accuracy and optionally save it
    Train {
        /// Training data in MNIST CSV format
        #[arg(long)]
        train_csv: PathBuf,

        /// Evaluation data in MNIST CSV format
        #[arg(long)]
        test_csv: PathBuf,

        /// JSON training config; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Learning rate
        #[arg(long)]
        learning_rate: Option<f32>,

        /// Examples per batch (greater than 1)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Hidden layer width
        #[arg(long)]
        hidden_size: Option<usize>,

        /// Seed for weight initialization and shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Average gradients over each batch instead of updating per example
        #[arg(long)]
        batch_averaged: bool,

        /// Where to save the trained network
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Report the accuracy of a saved network
    Evaluate {
        /// Saved network
        #[arg(short, long)]
        model: PathBuf,

        /// Evaluation data in MNIST CSV format
        #[arg(long)]
        test_csv: PathBuf,

        /// Examples per batch (greater than 1)
        #[arg(long, default_value = "10")]
        batch_size: usize,
    },

    /// Classify one record of a CSV file with a saved network
    Predict {
        /// Saved network
        #[arg(short, long)]
        model: PathBuf,

        /// Data in MNIST CSV format
        #[arg(long)]
        csv: PathBuf,

        /// Row to classify
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Train {
            train_csv,
            test_csv,
            config,
            epochs,
            learning_rate,
            batch_size,
            hidden_size,
            seed,
            batch_averaged,
            save,
        } => {
            let mut config = match config {
                Some(path) => TrainingConfig::from_path(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => TrainingConfig::default(),
            };
            if let Some(v) = epochs {
                config.epochs = v;
            }
            if let Some(v) = learning_rate {
                config.learning_rate = v;
            }
            if let Some(v) = batch_size {
                config.batch_size = v;
            }
            if let Some(v) = hidden_size {
                config.hidden_size = v;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if batch_averaged {
                config.update_scheme = UpdateScheme::BatchAveraged;
            }

            train(&config, &train_csv, &test_csv, save.as_deref())
        }
        Commands::Evaluate {
            model,
            test_csv,
            batch_size,
        } => {
            let mut network = Sequential::load_from_path(&model)
                .with_context(|| format!("loading network {}", model.display()))?;
            let mut data = MnistDataloader::new(&test_csv, batch_size)
                .with_context(|| format!("loading {}", test_csv.display()))?;

            let accuracy = network.evaluate(&mut data)?;
            println!("Accuracy of loaded model: {:.4}", accuracy);
            Ok(())
        }
        Commands::Predict { model, csv, index } => {
            let mut network = Sequential::load_from_path(&model)
                .with_context(|| format!("loading network {}", model.display()))?;
            let data = MnistDataloader::new(&csv, 2)
                .with_context(|| format!("loading {}", csv.display()))?;
            let pair = data
                .get(index)
                .with_context(|| format!("{} has no valid row {}", csv.display(), index))?;

            // Inference failures are reported, not propagated
            match network.predict(&pair.input()) {
                Ok(digit) => println!("Prediction: {} (label {})", digit, pair.label),
                Err(e) => {
                    warn!(error = %e, "inference failed");
                    println!("Prediction unavailable");
                }
            }
            Ok(())
        }
    }
}

fn train(
    config: &TrainingConfig,
    train_csv: &Path,
    test_csv: &Path,
    save: Option<&Path>,
) -> Result<()> {
    let mut network = config.build_network()?;
    network.summary();

    let mut train_data = MnistDataloader::new(train_csv, config.batch_size)
        .with_context(|| format!("loading {}", train_csv.display()))?;
    if let Some(seed) = config.seed {
        train_data = train_data.with_shuffle(seed);
    }
    let mut test_data = MnistDataloader::new(test_csv, config.batch_size)
        .with_context(|| format!("loading {}", test_csv.display()))?;

    let batches = train_data.len().div_ceil(config.batch_size) as u64;
    for epoch in 0..config.epochs {
        let progress = ProgressBar::new(batches);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | Loss: {msg}")?
                .progress_chars("█▓░"),
        );

        let epoch_cost = network.train_one_epoch_with_progress(&mut train_data, &progress)?;
        progress.finish_and_clear();

        // The reported cost is scaled by the learning rate
        println!(
            "Epoch {} cost: {}",
            epoch + 1,
            epoch_cost / config.learning_rate
        );
        train_data.reset();
    }

    let accuracy = network.evaluate(&mut test_data)?;
    println!("Accuracy of trained model: {:.4}", accuracy);

    if let Some(path) = save {
        network
            .save_to_path(path)
            .with_context(|| format!("saving network to {}", path.display()))?;
        info!(path = %path.display(), "network saved");
    }

    Ok(())
}
