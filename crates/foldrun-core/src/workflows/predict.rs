use crate::core::io::pdb;
use crate::core::models::features::FeatureBundle;
use crate::core::models::structure::{StructureModel, broadcast_per_atom};
use crate::engine::artifacts;
use crate::engine::config::PredictionConfig;
use crate::engine::error::EngineError;
use crate::engine::interfaces::{FeatureProvider, ModelRunner, ModelSet, Relaxer};
use crate::engine::ledger::TimingLedger;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::ranking::{self, Ranking};
use crate::engine::sink::{ArtifactSink, SinkFailure};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// One unit of work: one input sequence through the full prediction
/// workflow. Immutable once created; the output directory is derived from
/// `output_root` and the (batch-unique) `sequence_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceJob {
    pub sequence_id: String,
    pub input_path: PathBuf,
    pub output_root: PathBuf,
}

impl SequenceJob {
    pub fn new(
        sequence_id: impl Into<String>,
        input_path: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            input_path: input_path.into(),
            output_root: output_root.into(),
        }
    }

    /// Derives the sequence id from the input file's basename, the same
    /// convention the batch front end uses for FASTA inputs.
    pub fn from_input_path(
        input_path: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Option<Self> {
        let input_path = input_path.into();
        let sequence_id = input_path.file_stem()?.to_str()?.to_string();
        Some(Self {
            sequence_id,
            input_path,
            output_root: output_root.into(),
        })
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.sequence_id)
    }
}

/// Everything one completed job produced: the ranking, the timing ledger,
/// the paths of all locally written artifacts, and any per-artifact sink
/// failures (non-fatal; the prediction itself completed).
#[derive(Debug)]
pub struct JobOutcome {
    pub sequence_id: String,
    pub ranking: Ranking,
    pub timings: TimingLedger,
    pub artifacts: Vec<PathBuf>,
    pub sink_failures: Vec<SinkFailure>,
}

impl JobOutcome {
    pub fn fully_uploaded(&self) -> bool {
        self.sink_failures.is_empty()
    }
}

struct PredictionRecord {
    mean_plddt: f64,
    relaxed_pdb: String,
}

/// Runs the complete prediction workflow for one sequence job.
///
/// Feature extraction happens exactly once and is checkpointed before any
/// model runs; models execute sequentially in configuration-set order; the
/// ranking is computed only after every model has produced a record. Any
/// stage or storage failure aborts the job immediately (a missing record
/// would corrupt the ranking), leaving already-written artifacts in place
/// for diagnosis. Sink failures are collected per artifact and never abort
/// the job.
#[instrument(skip_all, name = "prediction_workflow", fields(sequence_id = %job.sequence_id))]
pub fn run(
    job: &SequenceJob,
    feature_provider: &dyn FeatureProvider,
    models: &ModelSet,
    relaxer: &dyn Relaxer,
    sink: &dyn ArtifactSink,
    config: &PredictionConfig,
    reporter: &ProgressReporter,
) -> Result<JobOutcome, EngineError> {
    if models.is_empty() {
        return Err(EngineError::EmptyModelSet);
    }

    let output_dir = job.output_dir();
    let msa_dir = output_dir.join(artifacts::MSA_DIR);
    artifacts::ensure_dir(&output_dir)?;
    artifacts::ensure_dir(&msa_dir)?;

    let mut timings = TimingLedger::new();
    let mut written: Vec<PathBuf> = Vec::new();

    // === Phase 1: Feature extraction (once per job) ===
    reporter.report(Progress::PhaseStart {
        name: "Feature extraction",
    });
    info!("Running the feature-extraction pipeline.");
    let features = timings
        .time_stage("features", || {
            feature_provider.process(&job.input_path, &msa_dir)
        })
        .map_err(|source| EngineError::stage("features", source))?;

    // Checkpoint the bundle before any model runs, so a partially-failed
    // job's feature extraction can still be inspected.
    let features_path = output_dir.join(artifacts::FEATURES);
    artifacts::write_json(&features_path, &features)?;
    written.push(features_path);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Per-model inference and relaxation ===
    reporter.report(Progress::PhaseStart {
        name: "Model inference",
    });
    let mut records: IndexMap<String, PredictionRecord> = IndexMap::with_capacity(models.len());
    for (index, (model_name, runner)) in models.iter().enumerate() {
        reporter.report(Progress::StatusUpdate {
            text: format!("{model_name} ({}/{})", index + 1, models.len()),
        });
        info!(model = model_name, "Running model.");
        let record = run_model(
            &output_dir,
            model_name,
            runner,
            relaxer,
            &features,
            config,
            &mut timings,
            &mut written,
        )?;
        records.insert(model_name.to_string(), record);
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Rank by mean pLDDT and write ranked copies ===
    reporter.report(Progress::PhaseStart { name: "Ranking" });
    let plddts: IndexMap<String, f64> = records
        .iter()
        .map(|(name, record)| (name.clone(), record.mean_plddt))
        .collect();
    let ranking = ranking::rank_models(&plddts);

    for (rank, model_name) in ranking.order.iter().enumerate() {
        let record = records.get(model_name).ok_or_else(|| {
            EngineError::Internal(format!("ranking refers to unknown model '{model_name}'"))
        })?;
        let ranked_path = output_dir.join(artifacts::ranked_name(rank));
        artifacts::write_text(&ranked_path, &record.relaxed_pdb)?;
        written.push(ranked_path);
    }

    let ranking_path = output_dir.join(artifacts::RANKING_DEBUG);
    artifacts::write_json(&ranking_path, &ranking)?;
    written.push(ranking_path);
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Flush the timing ledger ===
    info!(timings = ?timings.iter().collect::<Vec<_>>(), "Final stage timings.");
    let timings_path = output_dir.join(artifacts::TIMINGS);
    artifacts::write_json(&timings_path, &timings)?;
    written.push(timings_path);

    // === Phase 5: Artifact hand-off ===
    // One failed upload must not prevent attempting the rest.
    reporter.report(Progress::PhaseStart {
        name: "Artifact upload",
    });
    let mut sink_failures = Vec::new();
    for path in &written {
        let name = artifacts::artifact_name(path);
        if let Err(error) = sink.put(&name, &job.sequence_id, path) {
            warn!(artifact = %name, %error, "Artifact hand-off failed.");
            sink_failures.push(SinkFailure {
                artifact: name,
                error,
            });
        }
    }
    reporter.report(Progress::PhaseFinish);

    info!(
        models = models.len(),
        artifacts = written.len(),
        upload_failures = sink_failures.len(),
        "Prediction workflow complete."
    );
    Ok(JobOutcome {
        sequence_id: job.sequence_id.clone(),
        ranking,
        timings,
        artifacts: written,
        sink_failures,
    })
}

#[allow(clippy::too_many_arguments)]
fn run_model(
    output_dir: &Path,
    model_name: &str,
    runner: &dyn ModelRunner,
    relaxer: &dyn Relaxer,
    features: &FeatureBundle,
    config: &PredictionConfig,
    timings: &mut TimingLedger,
    written: &mut Vec<PathBuf>,
) -> Result<PredictionRecord, EngineError> {
    let process_stage = format!("process_features_{model_name}");
    let processed = timings
        .time_stage(process_stage.clone(), || {
            runner.process_features(features, config.random_seed)
        })
        .map_err(|source| EngineError::stage(process_stage, source))?;

    let predict_stage = format!("predict_and_compile_{model_name}");
    let output = timings
        .time_stage(predict_stage.clone(), || runner.predict(&processed))
        .map_err(|source| EngineError::stage(predict_stage.clone(), source))?;
    info!(
        model = model_name,
        seconds = timings.get(&predict_stage),
        "Inference finished (duration includes compilation; see the benchmark flag)."
    );

    if config.benchmark {
        // Second run measures steady-state latency with compilation already
        // paid for; the result itself is discarded.
        let benchmark_stage = format!("predict_benchmark_{model_name}");
        timings
            .time_stage(benchmark_stage.clone(), || {
                runner.predict(&processed).map(|_| ())
            })
            .map_err(|source| EngineError::stage(benchmark_stage, source))?;
    }

    let mean_plddt = output
        .mean_plddt()
        .ok_or_else(|| EngineError::InvalidPrediction {
            model: model_name.to_string(),
            message: "empty per-residue confidence array".to_string(),
        })?;

    let result_path = output_dir.join(artifacts::result_name(model_name));
    artifacts::write_json(&result_path, &output)?;
    written.push(result_path);

    // Per-residue confidence goes into the b-factor column of the
    // structure output, repeated across each residue's atom slots.
    let b_factors = broadcast_per_atom(&output.plddt);
    let unrelaxed = StructureModel::from_prediction(&processed, &output, &b_factors)
        .map_err(|source| EngineError::stage(format!("format_{model_name}"), Box::new(source)))?;

    let unrelaxed_path = output_dir.join(artifacts::unrelaxed_name(model_name));
    artifacts::write_text(&unrelaxed_path, &pdb::to_pdb_string(&unrelaxed))?;
    written.push(unrelaxed_path);

    let relax_stage = format!("relax_{model_name}");
    let relaxed = timings
        .time_stage(relax_stage.clone(), || relaxer.relax(&unrelaxed))
        .map_err(|source| EngineError::stage(relax_stage, source))?;

    let relaxed_path = output_dir.join(artifacts::relaxed_name(model_name));
    artifacts::write_text(&relaxed_path, &relaxed.pdb)?;
    written.push(relaxed_path);

    Ok(PredictionRecord {
        mean_plddt,
        relaxed_pdb: relaxed.pdb,
    })
}
