use crate::core::models::features::FeatureBundle;
use crate::core::models::prediction::ModelOutput;
use crate::core::models::structure::StructureModel;
use crate::engine::error::BoxError;
use indexmap::IndexMap;
use std::path::Path;

/// The feature-extraction pipeline: a pure function of the input sequence,
/// the search databases, and the template cutoff configured into the
/// implementation.
///
/// Invoked exactly once per sequence job; the returned bundle is shared
/// read-only by every configured model.
pub trait FeatureProvider {
    /// Extracts the feature bundle for one input sequence. Alignment and
    /// template search output is written under `msa_dir`.
    fn process(&self, input_path: &Path, msa_dir: &Path) -> Result<FeatureBundle, BoxError>;
}

/// One independently trained inference model.
pub trait ModelRunner {
    /// Derives this model's processed view of the shared feature bundle.
    fn process_features(
        &self,
        features: &FeatureBundle,
        random_seed: u64,
    ) -> Result<FeatureBundle, BoxError>;

    /// Runs inference. The first call may be arbitrarily long (just-in-time
    /// compilation plus computation); there is no mid-flight cancellation.
    fn predict(&self, processed: &FeatureBundle) -> Result<ModelOutput, BoxError>;
}

/// A relaxed structure plus the relaxer's internal energy diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxedStructure {
    pub pdb: String,
    pub initial_energy: Option<f64>,
    pub final_energy: Option<f64>,
}

/// Physical-energy-minimization post-process for a raw predicted structure.
pub trait Relaxer {
    fn relax(&self, unrelaxed: &StructureModel) -> Result<RelaxedStructure, BoxError>;
}

/// An insertion-ordered mapping from model name to model runner.
///
/// The order is significant: it is the order models are executed, the order
/// result files are produced, the iteration order of timing keys, and the
/// tie-break order of the final ranking. It is not itself the ranking order.
#[derive(Default)]
pub struct ModelSet {
    runners: IndexMap<String, Box<dyn ModelRunner>>,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, runner: Box<dyn ModelRunner>) {
        self.runners.insert(name.into(), runner);
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn ModelRunner)> {
        self.runners
            .iter()
            .map(|(name, runner)| (name.as_str(), runner.as_ref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.runners.keys().map(String::as_str)
    }
}
