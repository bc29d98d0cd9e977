use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "foldrun - orchestrates multi-model protein structure prediction: feature extraction, per-model inference, relaxation, confidence ranking, and artifact persistence.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict structures for one or more input sequences.
    Predict(PredictArgs),
}

/// Arguments for the `predict` subcommand.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// FASTA input files, one sequence each. File basenames must be unique
    /// within the batch; the basename names the per-sequence output
    /// directory.
    #[arg(short, long = "fasta", required = true, value_name = "PATH", num_args(1..))]
    pub fasta_paths: Vec<PathBuf>,

    /// Directory that will hold one output directory per sequence.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Run configuration in TOML format: external tool commands and the
    /// ordered model list.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Run every model's inference a second time and record its timing,
    /// to measure steady-state latency without the first-call compilation
    /// cost.
    #[arg(long)]
    pub benchmark: bool,

    /// Seed for the per-model feature processing. Generated randomly when
    /// omitted; the generated value is logged so a run can be reproduced.
    #[arg(long, value_name = "INT")]
    pub random_seed: Option<u64>,

    /// Mirror every produced artifact into this directory after each job.
    #[arg(long, value_name = "PATH")]
    pub upload_dir: Option<PathBuf>,
}
