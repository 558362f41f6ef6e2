//! Seed phase: optionally insert seed rows, table by table.

use seedbed_core::config::SeedConfig;
use seedbed_core::output::SeedOutput;
use seedbed_runtime::seed::SeedWriter;

use crate::error::SetupError;
use crate::handle::ServerHandle;

/// Insert seed rows per `config`, or return the empty output with zero
/// collaborator calls when `config` is absent.
///
/// Tables are written strictly in the order given, one at a time, and
/// each table's rows are handed to the writer in the order given;
/// callers rely on this for foreign-key ordering.
pub async fn run(
    handle: &ServerHandle,
    config: Option<&SeedConfig>,
    writer: &dyn SeedWriter,
) -> Result<SeedOutput, SetupError> {
    let Some(config) = config else {
        return Ok(SeedOutput::default());
    };

    let connection = handle.connection();
    let mut tables = Vec::with_capacity(config.tables.len());
    for table in &config.tables {
        let result = writer
            .insert(connection.as_ref(), &table.table, &table.rows)
            .await?;
        tracing::info!(
            table = %result.table,
            rows = result.rows_inserted,
            "Seeded table",
        );
        tables.push(result);
    }

    Ok(SeedOutput { tables })
}
