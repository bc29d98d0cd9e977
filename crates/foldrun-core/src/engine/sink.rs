use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Upload of '{artifact}' failed: {source}")]
    Io {
        artifact: String,
        #[source]
        source: io::Error,
    },
}

/// One failed artifact hand-off. Non-fatal to the job; the caller can retry
/// uploads without recomputation.
#[derive(Debug)]
pub struct SinkFailure {
    pub artifact: String,
    pub error: SinkError,
}

/// Durable storage accepting named artifacts.
///
/// The workflow depends only on upload-or-report-failure semantics per
/// artifact; the transport (local disk, network object storage) is the
/// implementation's business. A failure for one artifact must not prevent
/// the caller from attempting the rest.
pub trait ArtifactSink {
    fn put(&self, artifact: &str, namespace: &str, local_path: &Path) -> Result<(), SinkError>;
}

/// Sink that mirrors artifacts into `<root>/<namespace>/<artifact>`.
#[derive(Debug, Clone)]
pub struct LocalDirSink {
    root: PathBuf,
}

impl LocalDirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactSink for LocalDirSink {
    fn put(&self, artifact: &str, namespace: &str, local_path: &Path) -> Result<(), SinkError> {
        let dir = self.root.join(namespace);
        let io_failure = |source| SinkError::Io {
            artifact: artifact.to_string(),
            source,
        };
        fs::create_dir_all(&dir).map_err(io_failure)?;
        fs::copy(local_path, dir.join(artifact)).map_err(io_failure)?;
        Ok(())
    }
}

/// Sink for local-only runs; accepts and discards every artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ArtifactSink for NullSink {
    fn put(&self, _artifact: &str, _namespace: &str, _local_path: &Path) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_dir_sink_copies_into_namespace() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let local = source_dir.path().join("timings.json");
        fs::write(&local, "{}").unwrap();

        let sink = LocalDirSink::new(dest_dir.path());
        sink.put("timings.json", "seq_a", &local).unwrap();

        let uploaded = dest_dir.path().join("seq_a").join("timings.json");
        assert_eq!(fs::read_to_string(uploaded).unwrap(), "{}");
    }

    #[test]
    fn local_dir_sink_reports_missing_source() {
        let dest_dir = tempfile::tempdir().unwrap();
        let sink = LocalDirSink::new(dest_dir.path());

        let err = sink
            .put("gone.json", "seq_a", Path::new("/nonexistent/gone.json"))
            .unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }

    #[test]
    fn null_sink_accepts_everything() {
        NullSink
            .put("anything", "ns", Path::new("/nonexistent"))
            .unwrap();
    }
}
