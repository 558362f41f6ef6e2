//! Per-phase result records.
//!
//! An optional phase that was not configured still yields its record,
//! just empty. Consumers never branch on presence, only on contents.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One applied migration unit.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    /// Unit name, typically the migration filename.
    pub name: String,
    /// When the unit finished applying (UTC).
    pub applied_at: DateTime<Utc>,
}

/// Ordered record of applied migrations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationOutput {
    pub applied: Vec<AppliedMigration>,
}

impl MigrationOutput {
    /// True when no migration ran (phase skipped, or the directory held
    /// no units).
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Insertion outcome for one seeded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSeedResult {
    pub table: String,
    pub rows_inserted: u64,
}

/// Per-table seed outcomes, in the order the tables were given.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedOutput {
    pub tables: Vec<TableSeedResult>,
}

impl SeedOutput {
    /// True when no seeding ran.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
