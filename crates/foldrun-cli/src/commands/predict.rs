use crate::cli::PredictArgs;
use crate::config::RunConfig;
use crate::error::{CliError, Result};
use crate::progress::ProgressUi;
use foldrun::engine::progress::ProgressReporter;
use foldrun::engine::sink::{ArtifactSink, LocalDirSink, NullSink};
use foldrun::workflows::batch::{self, BatchOptions};
use foldrun::workflows::predict::SequenceJob;
use tracing::info;

pub fn run(args: PredictArgs) -> Result<()> {
    let config = RunConfig::from_file(&args.config)?;
    let feature_provider = config.feature_provider()?;
    let relaxer = config.relaxer()?;
    let models = config.model_set();
    info!(
        models = models.len(),
        inputs = args.fasta_paths.len(),
        "Run configuration loaded."
    );

    let mut jobs = Vec::with_capacity(args.fasta_paths.len());
    for path in &args.fasta_paths {
        let job = SequenceJob::from_input_path(path, &args.output).ok_or_else(|| {
            CliError::Config(format!(
                "Cannot derive a sequence id from input path '{}'.",
                path.display()
            ))
        })?;
        jobs.push(job);
    }

    let sink: Box<dyn ArtifactSink> = match &args.upload_dir {
        Some(dir) => Box::new(LocalDirSink::new(dir)),
        None => Box::new(NullSink),
    };

    let options = BatchOptions {
        random_seed: args.random_seed,
        benchmark: args.benchmark,
    };

    let ui = ProgressUi::new();
    let reporter = ProgressReporter::with_callback(ui.callback());

    println!("Starting structure prediction for {} input(s)...", jobs.len());
    let reports = batch::run(
        &jobs,
        &feature_provider,
        &models,
        &relaxer,
        sink.as_ref(),
        &options,
        &reporter,
    )?;
    drop(reporter);
    ui.finish();

    let mut failed = 0;
    for report in &reports {
        match &report.result {
            Ok(outcome) => {
                match outcome.ranking.best() {
                    Some((model, plddt)) => println!(
                        "✓ {}: best model {} (mean pLDDT {:.2})",
                        report.sequence_id, model, plddt
                    ),
                    None => println!("✓ {}: completed", report.sequence_id),
                }
                if !outcome.fully_uploaded() {
                    println!(
                        "  Warning: {} artifact upload(s) failed; local copies remain.",
                        outcome.sink_failures.len()
                    );
                }
            }
            Err(error) => {
                failed += 1;
                println!("✗ {}: {}", report.sequence_id, error);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::JobsFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}
