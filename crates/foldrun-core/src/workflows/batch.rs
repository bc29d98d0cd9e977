use crate::engine::config::PredictionConfig;
use crate::engine::error::EngineError;
use crate::engine::interfaces::{FeatureProvider, ModelSet, Relaxer};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sink::ArtifactSink;
use crate::workflows::predict::{self, JobOutcome, SequenceJob};
use rand::Rng;
use std::collections::HashSet;
use std::fs::File;
use tracing::{info, instrument, warn};

/// Batch-level settings. A missing seed is generated once, logged, and
/// shared by every job in the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub random_seed: Option<u64>,
    pub benchmark: bool,
}

/// The result of one job within a batch. Failed jobs keep their error here
/// instead of aborting the batch.
#[derive(Debug)]
pub struct JobReport {
    pub sequence_id: String,
    pub result: Result<JobOutcome, EngineError>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Validates a batch before any external call is made.
///
/// Checks: a non-empty model set, batch-unique sequence ids, and readable
/// input files. Any violation is a configuration error that aborts the
/// whole batch with no partial progress.
pub fn validate(jobs: &[SequenceJob], models: &ModelSet) -> Result<(), EngineError> {
    if models.is_empty() {
        return Err(EngineError::EmptyModelSet);
    }

    let mut seen = HashSet::new();
    for job in jobs {
        if !seen.insert(job.sequence_id.as_str()) {
            return Err(EngineError::DuplicateSequenceId {
                sequence_id: job.sequence_id.clone(),
            });
        }
        if File::open(&job.input_path).is_err() {
            return Err(EngineError::UnreadableInput {
                path: job.input_path.clone(),
            });
        }
    }
    Ok(())
}

/// Runs every job of a batch sequentially, with per-job isolation: a stage
/// or storage failure in one job is recorded in its report and the
/// remaining jobs are still attempted. Only configuration errors (caught by
/// [`validate`] before any work starts) abort the batch.
#[instrument(skip_all, name = "prediction_batch", fields(jobs = jobs.len()))]
pub fn run(
    jobs: &[SequenceJob],
    feature_provider: &dyn FeatureProvider,
    models: &ModelSet,
    relaxer: &dyn Relaxer,
    sink: &dyn ArtifactSink,
    options: &BatchOptions,
    reporter: &ProgressReporter,
) -> Result<Vec<JobReport>, EngineError> {
    validate(jobs, models)?;

    let random_seed = options
        .random_seed
        .unwrap_or_else(|| rand::thread_rng().r#gen());
    info!(random_seed, "Using random seed for the data pipeline.");
    let config = PredictionConfig {
        random_seed,
        benchmark: options.benchmark,
    };

    let mut reports = Vec::with_capacity(jobs.len());
    for job in jobs {
        reporter.report(Progress::Message(format!(
            "Predicting {}",
            job.sequence_id
        )));
        let result = predict::run(
            job,
            feature_provider,
            models,
            relaxer,
            sink,
            &config,
            reporter,
        );
        if let Err(error) = &result {
            // One failed sequence must not take down the rest of the batch.
            warn!(
                sequence_id = %job.sequence_id,
                %error,
                "Job failed; continuing with the remaining jobs."
            );
        }
        reports.push(JobReport {
            sequence_id: job.sequence_id.clone(),
            result,
        });
    }

    info!(
        succeeded = reports.iter().filter(|r| r.succeeded()).count(),
        failed = reports.iter().filter(|r| !r.succeeded()).count(),
        "Batch complete."
    );
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sink::NullSink;
    use crate::workflows::fixtures::{
        EchoRelaxer, SelectivePipeline, StaticModel, StaticPipeline,
    };
    use std::fs;
    use std::path::Path;

    fn job_with_input(dir: &Path, sequence_id: &str) -> SequenceJob {
        let input = dir.join(format!("{sequence_id}.fasta"));
        fs::write(&input, format!(">{sequence_id}\nMKV\n")).unwrap();
        SequenceJob::new(sequence_id, input, dir.join("out"))
    }

    fn single_model_set() -> ModelSet {
        let mut models = ModelSet::new();
        models.insert("m1", Box::new(StaticModel::new(vec![75.0, 85.0])));
        models
    }

    #[test]
    fn duplicate_sequence_ids_abort_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let job_a = job_with_input(dir.path(), "seq");
        let mut job_b = job_with_input(dir.path(), "other");
        job_b.sequence_id = "seq".to_string();
        let pipeline = StaticPipeline::new(2);

        let err = run(
            &[job_a.clone(), job_b],
            &pipeline,
            &single_model_set(),
            &EchoRelaxer,
            &NullSink,
            &BatchOptions::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            EngineError::DuplicateSequenceId { ref sequence_id } if sequence_id == "seq"
        ));
        assert_eq!(
            pipeline.calls.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
        assert!(!job_a.output_dir().exists());
    }

    #[test]
    fn empty_model_set_aborts_before_directory_creation() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_with_input(dir.path(), "seq");

        let err = run(
            &[job.clone()],
            &StaticPipeline::new(2),
            &ModelSet::new(),
            &EchoRelaxer,
            &NullSink,
            &BatchOptions::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::EmptyModelSet));
        assert!(!job.output_dir().exists());
    }

    #[test]
    fn unreadable_input_aborts_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let job = SequenceJob::new(
            "ghost",
            dir.path().join("ghost.fasta"),
            dir.path().join("out"),
        );

        let err = run(
            &[job],
            &StaticPipeline::new(2),
            &single_model_set(),
            &EchoRelaxer,
            &NullSink,
            &BatchOptions::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::UnreadableInput { .. }));
    }

    #[test]
    fn one_failed_job_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = [
            job_with_input(dir.path(), "bad_seq"),
            job_with_input(dir.path(), "good_seq"),
        ];
        let pipeline = SelectivePipeline {
            fail_for: "bad_seq".to_string(),
            inner: StaticPipeline::new(2),
        };

        let reports = run(
            &jobs,
            &pipeline,
            &single_model_set(),
            &EchoRelaxer,
            &NullSink,
            &BatchOptions::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert!(!reports[0].succeeded());
        assert!(reports[1].succeeded());
        assert!(matches!(
            reports[0].result,
            Err(EngineError::Stage { ref stage, .. }) if stage == "features"
        ));
        assert!(jobs[1].output_dir().join("ranked_0.pdb").is_file());
    }

    #[test]
    fn supplied_seed_is_shared_by_every_job() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = [
            job_with_input(dir.path(), "seq_a"),
            job_with_input(dir.path(), "seq_b"),
        ];
        let model = StaticModel::new(vec![60.0]);
        let seed_log = model.seed_log();
        let mut models = ModelSet::new();
        models.insert("m1", Box::new(model));

        let reports = run(
            &jobs,
            &StaticPipeline::new(1),
            &models,
            &EchoRelaxer,
            &NullSink,
            &BatchOptions {
                random_seed: Some(42),
                benchmark: false,
            },
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(reports.iter().all(JobReport::succeeded));
        assert_eq!(*seed_log.lock().unwrap(), vec![42, 42]);
    }
}
