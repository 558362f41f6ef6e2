//! Pure domain types for the seedbed provisioning harness.
//!
//! Configuration model, strategy tags, identifier synthesis, and the
//! shared phase-output records. This crate does no I/O and holds no async
//! code, so collaborator implementations and the pipeline can both depend
//! on it without dragging in a runtime.

pub mod config;
pub mod error;
pub mod ident;
pub mod output;
