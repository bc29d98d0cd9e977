use crate::core::io::pdb;
use crate::core::models::features::FeatureBundle;
use crate::core::models::prediction::ModelOutput;
use crate::core::models::structure::StructureModel;
use crate::engine::error::BoxError;
use crate::engine::interfaces::{FeatureProvider, ModelRunner, RelaxedStructure, Relaxer};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Invalid output from '{program}': {source}")]
    Decode {
        program: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error exchanging data with '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// An external executable plus its fixed leading arguments (database paths,
/// parameter directories, and the like). Per-invocation arguments are
/// appended by the caller.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Runs the tool to completion with `extra` appended to the fixed
    /// arguments. Captures stderr; a non-zero exit becomes an error
    /// carrying its tail.
    fn run(&self, extra: &[&str]) -> Result<(), ExecError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .output()
            .map_err(|source| ExecError::Spawn {
                program: self.program_name(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::Failed {
                program: self.program_name(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, ExecError> {
        let text = fs::read_to_string(path).map_err(|source| ExecError::Io {
            program: self.program_name(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ExecError::Decode {
            program: self.program_name(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> ExecError {
        ExecError::Io {
            program: self.program_name(),
            source,
        }
    }
}

fn temp_json_file(tool: &ToolCommand) -> Result<NamedTempFile, ExecError> {
    NamedTempFile::new().map_err(|source| tool.io_error(source))
}

fn write_json_file<T: serde::Serialize>(
    tool: &ToolCommand,
    path: &Path,
    value: &T,
) -> Result<(), ExecError> {
    let text = serde_json::to_string(value).map_err(|source| ExecError::Decode {
        program: tool.program_name(),
        source,
    })?;
    fs::write(path, text).map_err(|source| tool.io_error(source))
}

/// Feature-extraction pipeline driven as an external tool.
///
/// Invocation contract: the configured command is run with
/// `--input <fasta> --msa-dir <dir> --output <path>` appended and must
/// write the feature bundle as JSON to the output path.
#[derive(Debug, Clone)]
pub struct ExecFeatureProvider {
    tool: ToolCommand,
}

impl ExecFeatureProvider {
    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }
}

impl FeatureProvider for ExecFeatureProvider {
    fn process(&self, input_path: &Path, msa_dir: &Path) -> Result<FeatureBundle, BoxError> {
        let output = temp_json_file(&self.tool)?;
        self.tool.run(&[
            "--input",
            &input_path.to_string_lossy(),
            "--msa-dir",
            &msa_dir.to_string_lossy(),
            "--output",
            &output.path().to_string_lossy(),
        ])?;
        Ok(self.tool.read_json(output.path())?)
    }
}

/// One inference model driven as an external tool with two subcommands:
///
/// - `process-features --features <in> --random-seed <n> --output <out>`
/// - `predict --features <in> --output <out>`
///
/// Bundles and results are exchanged as JSON files.
#[derive(Debug, Clone)]
pub struct ExecModelRunner {
    tool: ToolCommand,
}

impl ExecModelRunner {
    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }
}

impl ModelRunner for ExecModelRunner {
    fn process_features(
        &self,
        features: &FeatureBundle,
        random_seed: u64,
    ) -> Result<FeatureBundle, BoxError> {
        let input = temp_json_file(&self.tool)?;
        let output = temp_json_file(&self.tool)?;
        write_json_file(&self.tool, input.path(), features)?;
        self.tool.run(&[
            "process-features",
            "--features",
            &input.path().to_string_lossy(),
            "--random-seed",
            &random_seed.to_string(),
            "--output",
            &output.path().to_string_lossy(),
        ])?;
        Ok(self.tool.read_json(output.path())?)
    }

    fn predict(&self, processed: &FeatureBundle) -> Result<ModelOutput, BoxError> {
        let input = temp_json_file(&self.tool)?;
        let output = temp_json_file(&self.tool)?;
        write_json_file(&self.tool, input.path(), processed)?;
        self.tool.run(&[
            "predict",
            "--features",
            &input.path().to_string_lossy(),
            "--output",
            &output.path().to_string_lossy(),
        ])?;
        Ok(self.tool.read_json(output.path())?)
    }
}

/// Optional energy diagnostics a relaxer tool may emit alongside the
/// relaxed structure.
#[derive(Debug, Default, Deserialize)]
struct RelaxDiagnostics {
    #[serde(default)]
    initial_energy: Option<f64>,
    #[serde(default)]
    final_energy: Option<f64>,
}

/// Relaxation driven as an external tool.
///
/// Invocation contract: run with `--input <unrelaxed.pdb> --output
/// <relaxed.pdb> --diagnostics <diag.json>` appended; the diagnostics file
/// is optional and, when present, holds `initial_energy`/`final_energy`.
#[derive(Debug, Clone)]
pub struct ExecRelaxer {
    tool: ToolCommand,
}

impl ExecRelaxer {
    pub fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }
}

impl Relaxer for ExecRelaxer {
    fn relax(&self, unrelaxed: &StructureModel) -> Result<RelaxedStructure, BoxError> {
        let input = temp_json_file(&self.tool)?;
        let output = temp_json_file(&self.tool)?;
        let diagnostics_file = temp_json_file(&self.tool)?;
        fs::write(input.path(), pdb::to_pdb_string(unrelaxed))
            .map_err(|source| self.tool.io_error(source))?;

        self.tool.run(&[
            "--input",
            &input.path().to_string_lossy(),
            "--output",
            &output.path().to_string_lossy(),
            "--diagnostics",
            &diagnostics_file.path().to_string_lossy(),
        ])?;

        let relaxed_pdb = fs::read_to_string(output.path())
            .map_err(|source| self.tool.io_error(source))?;
        let diagnostics: RelaxDiagnostics = self
            .tool
            .read_json(diagnostics_file.path())
            .unwrap_or_default();

        Ok(RelaxedStructure {
            pdb: relaxed_pdb,
            initial_energy: diagnostics.initial_energy,
            final_energy: diagnostics.final_energy,
        })
    }
}
