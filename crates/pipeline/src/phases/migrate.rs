//! Migration phase: optionally apply ordered migration units.

use std::path::Path;

use chrono::Utc;
use seedbed_core::config::{MigrateConfig, MigrateStrategy};
use seedbed_core::output::{AppliedMigration, MigrationOutput};
use seedbed_runtime::migration::{MigrationSource, SqlDirectorySource};

use crate::error::SetupError;
use crate::handle::ServerHandle;

/// Apply migrations per `config`, or return the empty output with zero
/// collaborator calls when `config` is absent.
pub async fn run(
    handle: &ServerHandle,
    config: Option<&MigrateConfig>,
) -> Result<MigrationOutput, SetupError> {
    let Some(config) = config else {
        return Ok(MigrationOutput::default());
    };

    // Dispatch is exhaustive: a new strategy extends this match.
    let source = match config.strategy {
        MigrateStrategy::Sql => SqlDirectorySource,
    };
    run_with_source(handle, &config.root, &source).await
}

/// Apply every unit the source yields, in order. A failing unit aborts
/// the whole setup call; there is no partial-migration recovery.
pub(crate) async fn run_with_source(
    handle: &ServerHandle,
    root: &Path,
    source: &dyn MigrationSource,
) -> Result<MigrationOutput, SetupError> {
    let units = source
        .load(root)
        .await
        .map_err(|source| SetupError::MigrationLoad {
            root: root.to_path_buf(),
            source,
        })?;

    let connection = handle.connection();
    let mut applied = Vec::with_capacity(units.len());
    for unit in units {
        if let Err(source) = connection.execute(&unit.body).await {
            return Err(SetupError::Migration {
                name: unit.name,
                applied: applied.len(),
                source,
            });
        }
        tracing::info!(unit = %unit.name, "Applied migration");
        applied.push(AppliedMigration {
            name: unit.name,
            applied_at: Utc::now(),
        });
    }

    Ok(MigrationOutput { applied })
}
