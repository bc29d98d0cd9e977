//! Implementations of the collaborator contracts.
//!
//! The heavyweight subsystems the workflow coordinates (alignment search,
//! neural-network inference, physical relaxation) live outside this crate;
//! [`exec`] drives them as configured external executables exchanging
//! JSON and PDB files.

pub mod exec;
