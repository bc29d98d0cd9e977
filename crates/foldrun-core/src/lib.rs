//! # foldrun Core Library
//!
//! A library for orchestrating multi-model protein structure prediction: one
//! input sequence is fed through an external feature-extraction pipeline, a
//! set of independently trained inference models, and a physical relaxation
//! post-process, after which the results are ranked by confidence and every
//! artifact is persisted to durable storage.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict layered architecture to keep the
//! orchestration logic separate from the heavyweight external subsystems it
//! coordinates.
//!
//! - **[`core`]: The Foundation.** Stateless data models (feature bundles,
//!   prediction outputs, structure records) and I/O utilities (PDB text
//!   serialization).
//!
//! - **[`engine`]: The Logic Core.** Configuration, the error taxonomy, the
//!   timing ledger, confidence ranking, artifact naming, progress reporting,
//!   and the narrow contracts behind which the external collaborators live.
//!
//! - **[`workflows`]: The Public API.** The per-sequence prediction workflow
//!   ([`workflows::predict::run`]) and the batch driver
//!   ([`workflows::batch::run`]) that ties everything together.
//!
//! - **[`providers`]: Collaborator Implementations.** Subprocess-backed
//!   implementations of the collaborator traits, for driving real external
//!   tools from the command line.

pub mod core;
pub mod engine;
pub mod providers;
pub mod workflows;
