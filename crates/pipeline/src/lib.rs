//! Orchestration engine for ephemeral test databases.
//!
//! One setup call runs a fixed pipeline (server, database, migrate,
//! seed), each phase delegating its real work to a collaborator from
//! `seedbed-runtime`, and returns a [`Setup`] bundling the server handle,
//! the phase outputs, and one composite [`Teardown`]. If a phase fails,
//! the teardown accumulated by the phases that already completed is
//! handed back through [`SetupFailure`] so the caller can still release
//! everything that was acquired.
//!
//! ```no_run
//! use std::sync::Arc;
//! use seedbed_pipeline::{Collaborators, Orchestrator};
//!
//! # async fn example(
//! #     runtime: Arc<dyn seedbed_runtime::container::ContainerRuntime>,
//! #     connector: Arc<dyn seedbed_runtime::connection::Connector>,
//! #     seed_writer: Arc<dyn seedbed_runtime::seed::SeedWriter>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(Collaborators {
//!     runtime,
//!     connector,
//!     seed_writer,
//! });
//!
//! let config = serde_json::from_str(r#"{ "server": { "strategy": "container" } }"#)?;
//! let setup = orchestrator.setup(config).await.map_err(|f| f.error)?;
//!
//! // ... run tests against setup.server ...
//!
//! setup.teardown.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handle;
pub mod orchestrator;
pub mod phases;
pub mod readiness;
pub mod teardown;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{SetupError, SetupFailure};
pub use handle::ServerHandle;
pub use orchestrator::{Collaborators, Orchestrator, Setup};
pub use readiness::ReadinessConfig;
pub use teardown::{Teardown, TeardownError, TeardownStep};
