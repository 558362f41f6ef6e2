//! Seed-writing collaborator interface.
//!
//! Turning a JSON row into an `INSERT` for a specific server dialect is
//! the implementor's concern. The pipeline guarantees it hands tables
//! and rows over in exactly the order the caller gave them.

use async_trait::async_trait;
use seedbed_core::config::SeedRow;
use seedbed_core::output::TableSeedResult;

use crate::connection::Connection;

#[derive(Debug, thiserror::Error)]
#[error("Failed to seed table \"{table}\": {reason}")]
pub struct SeedWriteError {
    pub table: String,
    pub reason: String,
}

/// Writes seed rows into one table over an open connection.
#[async_trait]
pub trait SeedWriter: Send + Sync {
    /// Insert `rows` into `table`, preserving row order.
    async fn insert(
        &self,
        connection: &dyn Connection,
        table: &str,
        rows: &[SeedRow],
    ) -> Result<TableSeedResult, SeedWriteError>;
}
