//! The server handle shared by all phases after acquisition.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use seedbed_runtime::connection::{Connection, Credentials, ServerAddress};

/// A reachable backing server with a live connection.
///
/// Built by the server phase once the readiness handshake succeeds, then
/// shared read-only by the downstream phases. The database phase rebinds
/// it to a freshly created database via [`ServerHandle::rebind`].
#[derive(Clone)]
pub struct ServerHandle {
    /// Identity token: the generated instance name for provisioned
    /// servers, the address for adopted ones.
    pub name: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Logical database the connection is bound to.
    pub database: String,
    /// When the handle became ready (UTC).
    pub created_at: DateTime<Utc>,
    connection: Arc<dyn Connection>,
}

impl ServerHandle {
    pub(crate) fn new(
        name: String,
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
        connection: Arc<dyn Connection>,
    ) -> Self {
        Self {
            name,
            host,
            port,
            user,
            password,
            database,
            created_at: Utc::now(),
            connection,
        }
    }

    /// The live connection.
    pub fn connection(&self) -> Arc<dyn Connection> {
        Arc::clone(&self.connection)
    }

    /// Network address of the server.
    pub fn address(&self) -> ServerAddress {
        ServerAddress {
            host: self.host.clone(),
            port: self.port,
        }
    }

    /// Credentials for the currently bound database.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }

    /// A copy of this handle bound to another database on the same
    /// server, with its own connection.
    pub(crate) fn rebind(&self, database: String, connection: Arc<dyn Connection>) -> Self {
        Self {
            database,
            connection,
            ..self.clone()
        }
    }
}

impl fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHandle")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("created_at", &self.created_at)
            .finish()
    }
}
