use crate::engine::error::EngineError;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Artifact file names within a job's output directory.
///
/// Names are a pure function of model name and rank index, so no two
/// artifacts of the same job can collide.
pub const FEATURES: &str = "features.json";
pub const RANKING_DEBUG: &str = "ranking_debug.json";
pub const TIMINGS: &str = "timings.json";

/// Subdirectory for alignment and template search output.
pub const MSA_DIR: &str = "msas";

pub fn result_name(model: &str) -> String {
    format!("result_{model}.json")
}

pub fn unrelaxed_name(model: &str) -> String {
    format!("unrelaxed_{model}.pdb")
}

pub fn relaxed_name(model: &str) -> String {
    format!("relaxed_{model}.pdb")
}

pub fn ranked_name(rank: usize) -> String {
    format!("ranked_{rank}.pdb")
}

/// Creates a directory and its parents. Pre-existing directories are not an
/// error; any other failure is a storage error fatal to the job.
pub fn ensure_dir(path: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(path).map_err(|source| EngineError::Storage {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_text(path: &Path, contents: &str) -> Result<(), EngineError> {
    fs::write(path, contents).map_err(|source| EngineError::Storage {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), EngineError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| EngineError::Storage {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, source),
    })?;
    write_text(path, &text)
}

/// Convenience for callers that track written artifacts by absolute path.
pub fn artifact_name(path: &PathBuf) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
