//! Container runtime collaborator interface.
//!
//! The pipeline's container strategy asks a [`ContainerRuntime`] to start
//! a disposable database container and, at teardown, to stop it. How the
//! runtime does this (Docker CLI, API socket, a remote builder) is the
//! implementor's concern.

use async_trait::async_trait;

/// Everything a runtime needs to start one database container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Instance name. Generated names carry a collision-resistant suffix
    /// so parallel test runs never clash.
    pub name: String,
    /// Server version hint (e.g. an image tag). `None` means the
    /// runtime's default.
    pub version: Option<String>,
    /// Host port to expose. `0` asks the runtime for an ephemeral port.
    pub port: u16,
    /// Superuser created in the container.
    pub user: String,
    pub password: String,
    /// Initial logical database.
    pub database: String,
}

/// A started container, as reported back by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningContainer {
    /// Runtime-assigned container id, used to stop it later.
    pub id: String,
    /// Host the database is reachable on.
    pub host: String,
    /// Actual bound port (resolved when the spec asked for port `0`).
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The container failed to start.
    #[error("Failed to start container \"{name}\": {reason}")]
    Start { name: String, reason: String },

    /// The container failed to stop.
    #[error("Failed to stop container {id}: {reason}")]
    Stop { id: String, reason: String },
}

/// Starts and stops disposable database containers.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Start a container for `spec` and report where it is reachable.
    async fn start(&self, spec: &ContainerSpec) -> Result<RunningContainer, ContainerError>;

    /// Stop (and dispose of) the container with the given id.
    ///
    /// Implementations must tolerate an id that was already stopped:
    /// teardown may run more than once in degenerate caller code, and a
    /// repeated stop must not fail the remaining cleanup.
    async fn stop(&self, id: &str) -> Result<(), ContainerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_error_names_the_container() {
        let err = ContainerError::Start {
            name: "seedbed-ab12".to_string(),
            reason: "image pull failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to start container \"seedbed-ab12\": image pull failed"
        );
    }

    #[test]
    fn stop_error_names_the_id() {
        let err = ContainerError::Stop {
            id: "c0ffee".to_string(),
            reason: "daemon unreachable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to stop container c0ffee: daemon unreachable"
        );
    }
}
