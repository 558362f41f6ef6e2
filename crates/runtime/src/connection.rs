//! Database connection collaborator interface.
//!
//! The wire protocol is the implementor's concern; the pipeline only
//! needs to open a connection, execute statements, and close it again.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

/// Network address of a reachable server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Credentials and target database for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    /// Logical database to connect to.
    pub database: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The server refused or never answered the connection attempt.
    #[error("Failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    /// A statement was rejected or the connection dropped mid-statement.
    #[error("Statement failed: {reason}")]
    Execute { reason: String },
}

/// Opens connections to a database server.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open one connection. A refused connection is an error, not a
    /// retry loop; the pipeline owns retry policy.
    async fn connect(
        &self,
        address: &ServerAddress,
        credentials: &Credentials,
    ) -> Result<Arc<dyn Connection>, ConnectionError>;
}

/// A live connection to one logical database.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a single statement, returning the number of affected rows.
    async fn execute(&self, statement: &str) -> Result<u64, ConnectionError>;

    /// Close the connection. Implementations should make a repeated
    /// close harmless.
    async fn close(&self) -> Result<(), ConnectionError>;
}
