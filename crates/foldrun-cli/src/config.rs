use crate::error::{CliError, Result};
use foldrun::engine::interfaces::ModelSet;
use foldrun::providers::exec::{
    ExecFeatureProvider, ExecModelRunner, ExecRelaxer, ToolCommand,
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// One external executable with its fixed leading arguments, as written in
/// the run configuration.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    fn to_tool(&self) -> ToolCommand {
        ToolCommand::new(&self.program).args(self.args.iter().cloned())
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct ToolsConfig {
    #[serde(rename = "feature-extractor")]
    feature_extractor: Option<CommandConfig>,
    relaxer: Option<CommandConfig>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Relaxation parameters forwarded to the relaxer tool. The defaults match
/// unrestricted minimization with a light harmonic restraint.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct RelaxConfig {
    #[serde(rename = "max-iterations")]
    pub max_iterations: u64,
    #[serde(rename = "energy-tolerance")]
    pub energy_tolerance: f64,
    pub stiffness: f64,
    #[serde(rename = "max-outer-iterations")]
    pub max_outer_iterations: u64,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            max_iterations: 0,
            energy_tolerance: 2.39,
            stiffness: 10.0,
            max_outer_iterations: 20,
        }
    }
}

impl RelaxConfig {
    fn to_args(&self) -> Vec<String> {
        vec![
            "--max-iterations".to_string(),
            self.max_iterations.to_string(),
            "--energy-tolerance".to_string(),
            self.energy_tolerance.to_string(),
            "--stiffness".to_string(),
            self.stiffness.to_string(),
            "--max-outer-iterations".to_string(),
            self.max_outer_iterations.to_string(),
        ]
    }
}

/// The run configuration: which external tools to drive and the ordered
/// list of inference models.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    tools: ToolsConfig,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub relax: RelaxConfig,
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(CliError::Config(
                "At least one `[[models]]` entry is required.".to_string(),
            ));
        }
        for (i, model) in self.models.iter().enumerate() {
            if self.models[..i].iter().any(|m| m.name == model.name) {
                return Err(CliError::Config(format!(
                    "Duplicate model name '{}' in the run configuration.",
                    model.name
                )));
            }
        }
        Ok(())
    }

    pub fn feature_provider(&self) -> Result<ExecFeatureProvider> {
        let command = self.tools.feature_extractor.as_ref().ok_or_else(|| {
            CliError::Config("`tools.feature-extractor` section is required.".to_string())
        })?;
        Ok(ExecFeatureProvider::new(command.to_tool()))
    }

    /// Builds the ordered model set. Ranked output indices follow this
    /// order when confidences tie, so it is kept exactly as written.
    pub fn model_set(&self) -> ModelSet {
        let mut models = ModelSet::new();
        for model in &self.models {
            let tool = ToolCommand::new(&model.program).args(model.args.iter().cloned());
            models.insert(&model.name, Box::new(ExecModelRunner::new(tool)));
        }
        models
    }

    pub fn relaxer(&self) -> Result<ExecRelaxer> {
        let command = self
            .tools
            .relaxer
            .as_ref()
            .ok_or_else(|| CliError::Config("`tools.relaxer` section is required.".to_string()))?;
        let tool = command.to_tool().args(self.relax.to_args());
        Ok(ExecRelaxer::new(tool))
    }
}
