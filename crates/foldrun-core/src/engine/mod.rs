//! The orchestration logic core.
//!
//! This layer owns everything the prediction workflow needs besides the data
//! models: the typed error taxonomy, configuration, the timing ledger that
//! doubles as an execution trace, confidence ranking, artifact naming and
//! local persistence, progress reporting, and the narrow trait contracts
//! behind which the external collaborators (feature pipeline, model runners,
//! relaxer, artifact sink) live.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod ledger;
pub mod progress;
pub mod ranking;
pub mod sink;
