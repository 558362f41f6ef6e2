//! Database phase: optionally create a fresh logical database and rebind
//! the handle to it.

use std::sync::Arc;

use seedbed_core::config::DatabaseConfig;
use seedbed_core::ident::{SuffixSource, DEFAULT_DATABASE_PREFIX};
use seedbed_runtime::connection::{Connector, Credentials};

use crate::error::SetupError;
use crate::handle::ServerHandle;
use crate::teardown::{Teardown, TeardownStep};

/// Create a database per `config` and return a handle bound to it, or
/// pass the handle through untouched when `config` is absent.
///
/// The absent case performs zero collaborator calls and registers no
/// teardown; it is a distinct code path, not a degenerate create.
pub async fn run(
    handle: ServerHandle,
    config: Option<&DatabaseConfig>,
    connector: &dyn Connector,
    suffixes: &dyn SuffixSource,
    teardown: &Teardown,
) -> Result<ServerHandle, SetupError> {
    let Some(config) = config else {
        return Ok(handle);
    };

    let prefix = config.prefix.as_deref().unwrap_or(DEFAULT_DATABASE_PREFIX);
    let name = format!("{prefix}_{}", suffixes.suffix());

    let admin = handle.connection();
    admin
        .execute(&format!("CREATE DATABASE \"{name}\""))
        .await
        .map_err(|source| SetupError::DatabaseCreate {
            name: name.clone(),
            source,
        })?;
    tracing::info!(database = %name, "Created database");

    // The drop action keeps the admin connection it needs, so releasing
    // the database never depends on the rebound connection.
    teardown.register(TeardownStep::new(format!("drop database {name}"), {
        let admin = Arc::clone(&admin);
        let name = name.clone();
        move || {
            Box::pin(async move {
                admin.execute(&format!("DROP DATABASE \"{name}\"")).await?;
                Ok(())
            })
        }
    }));

    let credentials = Credentials {
        database: name.clone(),
        ..handle.credentials()
    };
    let connection = connector
        .connect(&handle.address(), &credentials)
        .await
        .map_err(|source| SetupError::DatabaseConnect {
            name: name.clone(),
            source,
        })?;

    Ok(handle.rebind(name, connection))
}
