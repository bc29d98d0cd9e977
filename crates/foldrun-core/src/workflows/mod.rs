//! # Workflows Module
//!
//! The top-level entry points of the library. [`predict`] runs the complete
//! prediction workflow for one sequence job: feature extraction, per-model
//! inference, structural relaxation, confidence ranking, and artifact
//! persistence. [`batch`] validates and drives a whole batch of sequence
//! jobs through [`predict::run`], one job at a time.

pub mod batch;
pub mod predict;

#[cfg(test)]
pub(crate) mod fixtures;
