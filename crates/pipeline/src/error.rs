//! Setup-call error taxonomy.

use std::fmt;
use std::path::PathBuf;

use seedbed_core::error::ConfigError;
use seedbed_runtime::connection::ConnectionError;
use seedbed_runtime::container::ContainerError;
use seedbed_runtime::migration::MigrationSourceError;
use seedbed_runtime::seed::SeedWriteError;

use crate::readiness::ReadinessError;
use crate::teardown::Teardown;

/// A fatal setup error. Every variant aborts the whole setup call; there
/// is no mid-pipeline retry or partial recovery.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The configuration failed validation. Raised before any resource
    /// is acquired.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The backing server could not be started.
    #[error("Server acquisition failed: {0}")]
    Acquisition(#[from] ContainerError),

    /// The server started but never accepted a connection in time.
    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    /// `CREATE DATABASE` failed.
    #[error("Failed to create database \"{name}\": {source}")]
    DatabaseCreate {
        name: String,
        #[source]
        source: ConnectionError,
    },

    /// The database was created but a connection to it failed.
    #[error("Failed to connect to created database \"{name}\": {source}")]
    DatabaseConnect {
        name: String,
        #[source]
        source: ConnectionError,
    },

    /// The migration source could not produce its units.
    #[error("Failed to load migrations from {}: {source}", .root.display())]
    MigrationLoad {
        root: PathBuf,
        #[source]
        source: MigrationSourceError,
    },

    /// A migration unit failed. `applied` counts the units that had
    /// already been applied; the environment is unusable either way.
    #[error("Migration \"{name}\" failed after {applied} applied: {source}")]
    Migration {
        name: String,
        applied: usize,
        #[source]
        source: ConnectionError,
    },

    /// A seed table could not be written.
    #[error(transparent)]
    Seed(#[from] SeedWriteError),
}

/// A failed setup call.
///
/// Carries the teardown accumulated by the phases that completed before
/// the failure, so the caller's failure path can still release whatever
/// was acquired. The orchestrator never runs it on the caller's behalf.
#[derive(Debug)]
pub struct SetupFailure {
    pub error: SetupError,
    pub teardown: Teardown,
}

impl fmt::Display for SetupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for SetupFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
