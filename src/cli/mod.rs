// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`   — trains the classifier on a review CSV
//   2. `predict` — loads the model and classifies one text
//   3. `serve`   — loads the model and serves it over HTTP
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, PredictArgs, ServeArgs, TrainArgs};

use crate::application::predict_use_case::is_blank;

#[derive(Parser, Debug)]
#[command(
    name = "review-sentiment",
    version,
    about = "Train a transformer sentiment classifier on scored reviews, then serve it."
)]
pub struct Cli {
    /// The subcommand to run (train, predict or serve)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Serve(args)   => run_serve(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::{TrainOutcome, TrainUseCase};

    tracing::info!("Starting training on reviews in: {}", args.data);
    let model_dir = args.model_dir.clone();

    match TrainUseCase::new(args.into()).execute()? {
        TrainOutcome::Skipped => {
            println!("A trained model already exists in '{model_dir}'. Nothing to do.");
        }
        TrainOutcome::Trained(report) => {
            println!("Training complete. Model saved to '{model_dir}'.");
            println!("Accuracy: {:.4}  F1: {:.4}", report.accuracy, report.f1);
        }
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    // Checked before the model is loaded
    if is_blank(&args.text) {
        println!("🚨 Please enter some text before submitting.");
        return Ok(());
    }

    let use_case  = PredictUseCase::from_model_dir(&args.model_dir)?;
    let sentiment = use_case.classify(&args.text)?;
    println!("{} Sentiment: {}", sentiment.emoji(), sentiment);
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot start async runtime")?;
    runtime.block_on(crate::server::serve(args.into()))
}
