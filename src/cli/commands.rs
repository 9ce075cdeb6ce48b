// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `predict` and `serve`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//   - environment variable fallbacks for `serve`
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    encoder::DEFAULT_MAX_SEQ_LEN,
    splitter::{DEFAULT_MIN_RECORDS, DEFAULT_SEED, DEFAULT_VALIDATION_FRACTION},
};
use crate::server::{ServeConfig, DEFAULT_BIND_ADDR};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the sentiment classifier on a CSV of reviews
    Train(TrainArgs),

    /// Classify one piece of text with a trained model
    Predict(PredictArgs),

    /// Serve predictions over HTTP with a browser page at /
    Serve(ServeArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with `content` and `score` columns
    #[arg(long, default_value = "data/dataset.csv")]
    pub data: String,

    /// Directory for the trained model, tokenizer and checkpoints
    #[arg(long, default_value = "models")]
    pub model_dir: String,

    /// Where the best epoch's metrics are written
    #[arg(long, default_value = "metrics.txt")]
    pub metrics: String,

    /// Tokens per input sequence (truncated or padded to this length)
    #[arg(long, default_value_t = DEFAULT_MAX_SEQ_LEN)]
    pub max_seq_len: usize,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 5e-5)]
    pub lr: f64,

    /// Share of records held out for validation
    #[arg(long, default_value_t = DEFAULT_VALIDATION_FRACTION)]
    pub validation_fraction: f64,

    /// Seed for the train/validation shuffle and batch order
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Refuse to train on fewer usable records than this
    #[arg(long, default_value_t = DEFAULT_MIN_RECORDS)]
    pub min_records: usize,

    /// Hidden dimension of the encoder; must be divisible by num_heads
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Maximum vocabulary when the tokenizer is built from the corpus
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Strip punctuation and lowercase text before tokenising
    #[arg(long)]
    pub clean_text: bool,

    /// Trained model directory to fine-tune instead of starting fresh
    #[arg(long)]
    pub base_model: Option<String>,

    /// Pretrained tokenizer.json to use
    #[arg(long)]
    pub tokenizer: Option<String>,

    /// Do nothing if --model-dir already holds a trained model
    #[arg(long)]
    pub skip_if_trained: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:           a.data,
            model_dir:           a.model_dir,
            metrics_path:        a.metrics,
            max_seq_len:         a.max_seq_len,
            batch_size:          a.batch_size,
            epochs:              a.epochs,
            lr:                  a.lr,
            validation_fraction: a.validation_fraction,
            seed:                a.seed,
            min_records:         a.min_records,
            d_model:             a.d_model,
            num_heads:           a.num_heads,
            num_layers:          a.num_layers,
            d_ff:                a.d_ff,
            dropout:             a.dropout,
            vocab_size:          a.vocab_size,
            clean_text:          a.clean_text,
            base_model:          a.base_model,
            tokenizer:           a.tokenizer,
            skip_if_trained:     a.skip_if_trained,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The text to classify
    #[arg(long)]
    pub text: String,

    /// Directory the model was trained into
    #[arg(long, default_value = "models")]
    pub model_dir: String,
}

/// All arguments for the `serve` command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SENTIMENT_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// Directory the model was trained into
    #[arg(long, env = "SENTIMENT_MODEL_DIR", default_value = "models")]
    pub model_dir: String,
}

impl From<ServeArgs> for ServeConfig {
    fn from(a: ServeArgs) -> Self {
        ServeConfig {
            bind_addr: a.bind,
            model_dir: a.model_dir,
        }
    }
}
