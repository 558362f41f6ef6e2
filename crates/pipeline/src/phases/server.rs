//! Server phase: adopt an existing server or provision a new one, then
//! run the readiness handshake.

use std::sync::Arc;

use seedbed_core::config::{ProvisionRequest, ServerConfig, ServerStrategy};
use seedbed_core::ident::{ServerIdentity, SuffixSource};
use seedbed_runtime::connection::{Connector, Credentials, ServerAddress};
use seedbed_runtime::container::{ContainerRuntime, ContainerSpec};

use crate::error::SetupError;
use crate::handle::ServerHandle;
use crate::readiness::{wait_until_ready, ReadinessConfig};
use crate::teardown::{Teardown, TeardownStep};

/// Produce a ready [`ServerHandle`] from the server configuration.
///
/// Provisioning registers its stop action with `teardown` as soon as the
/// container exists, so a readiness failure after the start still leaves
/// the container releasable. Adoption registers nothing: the caller owns
/// the lifecycle of a server it supplied itself.
pub async fn run(
    config: &ServerConfig,
    runtime: &Arc<dyn ContainerRuntime>,
    connector: &dyn Connector,
    readiness: &ReadinessConfig,
    suffixes: &dyn SuffixSource,
    teardown: &Teardown,
) -> Result<ServerHandle, SetupError> {
    match config {
        ServerConfig::External(server) => {
            let address = ServerAddress {
                host: server.host.clone(),
                port: server.port,
            };
            let credentials = Credentials {
                user: server.user.clone(),
                password: server.password.clone(),
                database: server.database.clone(),
            };

            let connection =
                wait_until_ready(connector, &address, &credentials, readiness).await?;
            tracing::info!(address = %address, "Adopted existing server");

            Ok(ServerHandle::new(
                address.to_string(),
                server.host.clone(),
                server.port,
                server.user.clone(),
                server.password.clone(),
                server.database.clone(),
                connection,
            ))
        }
        ServerConfig::Provision(request) => {
            provision(request, runtime, connector, readiness, suffixes, teardown).await
        }
    }
}

async fn provision(
    request: &ProvisionRequest,
    runtime: &Arc<dyn ContainerRuntime>,
    connector: &dyn Connector,
    readiness: &ReadinessConfig,
    suffixes: &dyn SuffixSource,
    teardown: &Teardown,
) -> Result<ServerHandle, SetupError> {
    let identity = ServerIdentity::resolve(request, suffixes);

    // Dispatch is exhaustive: a new strategy extends this match.
    let running = match request.strategy {
        ServerStrategy::Container => {
            let spec = ContainerSpec {
                name: identity.server_name.clone(),
                version: request.version.clone(),
                port: identity.port,
                user: identity.user.clone(),
                password: identity.password.clone(),
                database: identity.database.clone(),
            };
            runtime.start(&spec).await?
        }
    };

    tracing::info!(
        container_id = %running.id,
        host = %running.host,
        port = running.port,
        "Provisioned database container",
    );

    teardown.register(TeardownStep::new(format!("stop container {}", running.id), {
        let runtime = Arc::clone(runtime);
        let id = running.id.clone();
        move || {
            Box::pin(async move {
                runtime.stop(&id).await?;
                Ok(())
            })
        }
    }));

    let address = ServerAddress {
        host: running.host.clone(),
        port: running.port,
    };
    let credentials = Credentials {
        user: identity.user.clone(),
        password: identity.password.clone(),
        database: identity.database.clone(),
    };
    let connection = wait_until_ready(connector, &address, &credentials, readiness).await?;

    Ok(ServerHandle::new(
        identity.server_name,
        running.host,
        running.port,
        identity.user,
        identity.password,
        identity.database,
        connection,
    ))
}
