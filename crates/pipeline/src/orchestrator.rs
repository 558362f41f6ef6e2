//! The orchestrator: one strict linear pass over the pipeline.
//!
//! `server → database → migrate → seed`, each phase awaited to
//! completion before the next starts. There is no mid-pipeline retry:
//! the call either reaches `Ready` and returns a [`Setup`], or fails
//! and returns a [`SetupFailure`] carrying the teardown accumulated so
//! far. Independent setup calls share nothing, so any number of them
//! may run concurrently.

use std::sync::Arc;

use seedbed_core::config::ProvisionConfig;
use seedbed_core::ident::{RandomSuffix, SuffixSource};
use seedbed_core::output::{MigrationOutput, SeedOutput};
use seedbed_runtime::connection::Connector;
use seedbed_runtime::container::ContainerRuntime;
use seedbed_runtime::seed::SeedWriter;
use uuid::Uuid;

use crate::error::{SetupError, SetupFailure};
use crate::handle::ServerHandle;
use crate::phases::{self, Phase};
use crate::readiness::ReadinessConfig;
use crate::teardown::Teardown;

/// External collaborators the pipeline delegates its real work to.
#[derive(Clone)]
pub struct Collaborators {
    pub runtime: Arc<dyn ContainerRuntime>,
    pub connector: Arc<dyn Connector>,
    pub seed_writer: Arc<dyn SeedWriter>,
}

/// A ready environment: the server handle, the phase outputs, and the
/// composite teardown. The caller decides when to run the teardown.
#[derive(Debug)]
pub struct Setup {
    pub server: ServerHandle,
    /// Applied migrations; empty when the migrate phase was skipped.
    pub migrations: MigrationOutput,
    /// Per-table seed outcomes; empty when the seed phase was skipped.
    pub seed: SeedOutput,
    pub teardown: Teardown,
}

/// Runs setup calls against a fixed set of collaborators.
pub struct Orchestrator {
    collaborators: Collaborators,
    readiness: ReadinessConfig,
    suffixes: Arc<dyn SuffixSource>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            readiness: ReadinessConfig::default(),
            suffixes: Arc::new(RandomSuffix),
        }
    }

    /// Override the readiness handshake tunables.
    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    /// Override the suffix source (deterministic suffixes in tests).
    pub fn with_suffix_source(mut self, suffixes: Arc<dyn SuffixSource>) -> Self {
        self.suffixes = suffixes;
        self
    }

    /// Provision one environment.
    ///
    /// On failure the teardown accumulated by the completed phases comes
    /// back inside the [`SetupFailure`]; it is never run here. Cleanup
    /// stays under the caller's control in both outcomes.
    pub async fn setup(&self, config: ProvisionConfig) -> Result<Setup, SetupFailure> {
        let setup_id = Uuid::new_v4();
        let teardown = Teardown::new();

        if let Err(error) = config.validate() {
            return Err(fail(setup_id, Phase::Server, error.into(), teardown));
        }

        let handle = match phases::server::run(
            &config.server,
            &self.collaborators.runtime,
            self.collaborators.connector.as_ref(),
            &self.readiness,
            self.suffixes.as_ref(),
            &teardown,
        )
        .await
        {
            Ok(handle) => handle,
            Err(error) => return Err(fail(setup_id, Phase::Server, error, teardown)),
        };

        let handle = match phases::database::run(
            handle,
            config.database.as_ref(),
            self.collaborators.connector.as_ref(),
            self.suffixes.as_ref(),
            &teardown,
        )
        .await
        {
            Ok(handle) => handle,
            Err(error) => return Err(fail(setup_id, Phase::Database, error, teardown)),
        };

        let migrations = match phases::migrate::run(&handle, config.migrate.as_ref()).await {
            Ok(output) => output,
            Err(error) => return Err(fail(setup_id, Phase::Migrate, error, teardown)),
        };

        let seed = match phases::seed::run(
            &handle,
            config.seed.as_ref(),
            self.collaborators.seed_writer.as_ref(),
        )
        .await
        {
            Ok(output) => output,
            Err(error) => return Err(fail(setup_id, Phase::Seed, error, teardown)),
        };

        tracing::info!(
            %setup_id,
            server = %handle.name,
            database = %handle.database,
            migrations = migrations.applied.len(),
            seeded_tables = seed.tables.len(),
            "Environment ready",
        );

        Ok(Setup {
            server: handle,
            migrations,
            seed,
            teardown,
        })
    }
}

fn fail(setup_id: Uuid, phase: Phase, error: SetupError, teardown: Teardown) -> SetupFailure {
    tracing::error!(
        %setup_id,
        phase = %phase,
        error = %error,
        pending_teardown = teardown.len(),
        "Setup failed",
    );
    SetupFailure { error, teardown }
}
