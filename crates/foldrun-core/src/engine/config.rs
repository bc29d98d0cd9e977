use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Per-job orchestration settings.
///
/// The random seed is mandatory: the orchestrator never derives one itself,
/// so a single recorded seed is enough to reproduce a job. Callers without a
/// preference generate one at the batch level (see `workflows::batch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionConfig {
    pub random_seed: u64,
    pub benchmark: bool,
}

#[derive(Default)]
pub struct PredictionConfigBuilder {
    random_seed: Option<u64>,
    benchmark: bool,
}

impl PredictionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn benchmark(mut self, enabled: bool) -> Self {
        self.benchmark = enabled;
        self
    }

    pub fn build(self) -> Result<PredictionConfig, ConfigError> {
        Ok(PredictionConfig {
            random_seed: self
                .random_seed
                .ok_or(ConfigError::MissingParameter("random_seed"))?,
            benchmark: self.benchmark,
        })
    }
}
