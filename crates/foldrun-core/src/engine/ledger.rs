use indexmap::IndexMap;
use serde::Serialize;
use std::time::Instant;

/// Append-only, insertion-ordered record of wall-clock durations per
/// pipeline stage.
///
/// The insertion order matches the order stages actually executed, so the
/// ledger doubles as an execution trace. It is flushed to storage once per
/// sequence job, after all models complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimingLedger {
    stages: IndexMap<String, f64>,
}

impl TimingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: impl Into<String>, seconds: f64) {
        self.stages.insert(stage.into(), seconds);
    }

    /// Runs `op`, and on success appends its elapsed wall-clock duration
    /// under `stage`. A failing `op` propagates its error and leaves the
    /// ledger untouched; the job aborts before the ledger is flushed, so a
    /// partial entry would never be observable anyway.
    pub fn time_stage<T, E>(
        &mut self,
        stage: impl Into<String>,
        op: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let started = Instant::now();
        let value = op()?;
        self.record(stage, started.elapsed().as_secs_f64());
        Ok(value)
    }

    pub fn get(&self, stage: &str) -> Option<f64> {
        self.stages.get(stage).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.stages.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_stage_records_on_success() {
        let mut ledger = TimingLedger::new();
        let value = ledger
            .time_stage("features", || Ok::<_, ()>(42))
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get("features").is_some_and(|s| s >= 0.0));
    }

    #[test]
    fn time_stage_leaves_no_entry_on_failure() {
        let mut ledger = TimingLedger::new();
        let result = ledger.time_stage("predict_and_compile_m1", || Err::<(), _>("boom"));

        assert_eq!(result, Err("boom"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn insertion_order_matches_execution_order() {
        let mut ledger = TimingLedger::new();
        ledger.record("features", 1.0);
        ledger.record("process_features_m1", 0.1);
        ledger.record("predict_and_compile_m1", 3.0);
        ledger.record("relax_m1", 2.0);

        let keys: Vec<_> = ledger.keys().collect();
        assert_eq!(
            keys,
            vec![
                "features",
                "process_features_m1",
                "predict_and_compile_m1",
                "relax_m1",
            ]
        );
    }

    #[test]
    fn serializes_to_ordered_json_object() {
        let mut ledger = TimingLedger::new();
        ledger.record("features", 1.5);
        ledger.record("relax_m1", 0.25);

        let text = serde_json::to_string(&ledger).unwrap();
        assert_eq!(text, r#"{"features":1.5,"relax_m1":0.25}"#);
    }
}
