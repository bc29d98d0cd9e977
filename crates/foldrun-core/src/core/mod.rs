//! Stateless data models and I/O utilities.
//!
//! Everything in this layer is a pure data representation: feature bundles
//! produced by the extraction pipeline, raw model outputs, and the atomic
//! structure records derived from them, together with the PDB text writer.

pub mod io;
pub mod models;
