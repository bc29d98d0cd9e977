//! In-memory collaborator fakes shared by the workflow tests.

use crate::core::models::features::{FeatureBundle, Tensor};
use crate::core::models::prediction::ModelOutput;
use crate::core::models::structure::{ATOM_TYPE_NUM, StructureModel};
use crate::engine::error::BoxError;
use crate::engine::interfaces::{FeatureProvider, ModelRunner, RelaxedStructure, Relaxer};
use crate::engine::sink::{ArtifactSink, SinkError};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A minimal but well-formed feature bundle for `num_residues` residues.
pub fn sequence_features(num_residues: usize) -> FeatureBundle {
    let mut features = FeatureBundle::new();
    features.insert(
        "aatype",
        Tensor::int(vec![num_residues], vec![0; num_residues]),
    );
    features.insert(
        "residue_index",
        Tensor::int(
            vec![num_residues],
            (0..num_residues as i64).collect::<Vec<_>>(),
        ),
    );
    features
}

/// A prediction output whose structure tensors populate the three backbone
/// slots of every residue.
pub fn model_output(plddt: Vec<f64>) -> ModelOutput {
    let num_residues = plddt.len();
    let mut mask = vec![0.0; num_residues * ATOM_TYPE_NUM];
    let positions = vec![0.0; num_residues * ATOM_TYPE_NUM * 3];
    for res in 0..num_residues {
        for slot in 0..3 {
            mask[res * ATOM_TYPE_NUM + slot] = 1.0;
        }
    }

    let mut output = ModelOutput::new(plddt);
    output.tensors.insert(
        "final_atom_positions",
        Tensor::float(vec![num_residues, ATOM_TYPE_NUM, 3], positions),
    );
    output.tensors.insert(
        "final_atom_mask",
        Tensor::float(vec![num_residues, ATOM_TYPE_NUM], mask),
    );
    output
}

/// Feature provider returning a fixed bundle and counting invocations.
pub struct StaticPipeline {
    pub features: FeatureBundle,
    pub calls: AtomicUsize,
}

impl StaticPipeline {
    pub fn new(num_residues: usize) -> Self {
        Self {
            features: sequence_features(num_residues),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FeatureProvider for StaticPipeline {
    fn process(&self, _input_path: &Path, _msa_dir: &Path) -> Result<FeatureBundle, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.features.clone())
    }
}

/// Feature provider that fails for one specific sequence id (by file stem)
/// and succeeds for all others.
pub struct SelectivePipeline {
    pub fail_for: String,
    pub inner: StaticPipeline,
}

impl FeatureProvider for SelectivePipeline {
    fn process(&self, input_path: &Path, msa_dir: &Path) -> Result<FeatureBundle, BoxError> {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem == self.fail_for {
            return Err("search tool exited with signal 9".into());
        }
        self.inner.process(input_path, msa_dir)
    }
}

/// Model runner with a fixed confidence profile; records every seed it was
/// handed into a log the test keeps a handle to.
pub struct StaticModel {
    pub plddt: Vec<f64>,
    pub seeds: Arc<Mutex<Vec<u64>>>,
}

impl StaticModel {
    pub fn new(plddt: Vec<f64>) -> Self {
        Self {
            plddt,
            seeds: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn seed_log(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.seeds)
    }
}

impl ModelRunner for StaticModel {
    fn process_features(
        &self,
        features: &FeatureBundle,
        random_seed: u64,
    ) -> Result<FeatureBundle, BoxError> {
        self.seeds.lock().unwrap().push(random_seed);
        Ok(features.clone())
    }

    fn predict(&self, _processed: &FeatureBundle) -> Result<ModelOutput, BoxError> {
        Ok(model_output(self.plddt.clone()))
    }
}

/// Model runner whose inference always fails.
pub struct FailingModel;

impl ModelRunner for FailingModel {
    fn process_features(
        &self,
        features: &FeatureBundle,
        _random_seed: u64,
    ) -> Result<FeatureBundle, BoxError> {
        Ok(features.clone())
    }

    fn predict(&self, _processed: &FeatureBundle) -> Result<ModelOutput, BoxError> {
        Err("inference backend crashed".into())
    }
}

/// Relaxer whose output text embeds the first atom's b-factor, so tests can
/// tell which model a relaxed structure came from.
pub struct EchoRelaxer;

impl Relaxer for EchoRelaxer {
    fn relax(&self, unrelaxed: &StructureModel) -> Result<RelaxedStructure, BoxError> {
        let marker = unrelaxed.atoms.first().map(|a| a.b_factor).unwrap_or(0.0);
        Ok(RelaxedStructure {
            pdb: format!("RELAXED b0={marker:.2}\n"),
            initial_energy: Some(10.0),
            final_energy: Some(1.0),
        })
    }
}

/// Sink recording every `(namespace, artifact)` hand-off.
#[derive(Default)]
pub struct RecordingSink {
    pub puts: Mutex<Vec<(String, String)>>,
}

impl ArtifactSink for RecordingSink {
    fn put(&self, artifact: &str, namespace: &str, _local_path: &Path) -> Result<(), SinkError> {
        self.puts
            .lock()
            .unwrap()
            .push((namespace.to_string(), artifact.to_string()));
        Ok(())
    }
}

/// Sink failing for exactly one artifact name.
pub struct FlakySink {
    pub fail_artifact: String,
    pub inner: RecordingSink,
}

impl ArtifactSink for FlakySink {
    fn put(&self, artifact: &str, namespace: &str, local_path: &Path) -> Result<(), SinkError> {
        if artifact == self.fail_artifact {
            return Err(SinkError::Io {
                artifact: artifact.to_string(),
                source: io::Error::other("bucket unreachable"),
            });
        }
        self.inner.put(artifact, namespace, local_path)
    }
}
