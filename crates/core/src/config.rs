//! Caller-facing configuration model.
//!
//! A [`ProvisionConfig`] describes one ephemeral environment: which server
//! to use (adopt an existing one, or provision a new one via a named
//! strategy), and optionally a fresh logical database, migrations to
//! apply, and seed data to insert.
//!
//! Strategies are tagged enum variants, so an unknown strategy tag fails
//! at deserialization with the offending tag named, and every dispatch
//! site is an exhaustive `match`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ident::{validate_identifier, validate_table_name};

/// One seed record: column name to JSON value.
pub type SeedRow = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Configuration for one setup call.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionConfig {
    /// Which server to use. The shape decides between adopting an
    /// existing server and provisioning a new one.
    pub server: ServerConfig,

    /// When present, create a fresh logical database on the server.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// When present, apply migrations after the server (and database)
    /// are ready.
    #[serde(default)]
    pub migrate: Option<MigrateConfig>,

    /// When present, insert seed rows after migrations.
    #[serde(default)]
    pub seed: Option<SeedConfig>,
}

impl ProvisionConfig {
    /// Validate caller-supplied identifiers before anything is acquired.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.server {
            ServerConfig::External(server) => server.validate()?,
            ServerConfig::Provision(request) => request.validate()?,
        }

        if let Some(database) = &self.database {
            if let Some(prefix) = &database.prefix {
                validate_identifier("database prefix", prefix)?;
            }
        }

        if let Some(seed) = &self.seed {
            seed.validate()?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Server selection: exactly one of the two variants is active, decided
/// by the shape of the value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServerConfig {
    /// A caller-supplied, already-running server. Adopted as-is; its
    /// lifecycle stays with the caller.
    External(ExternalServer),

    /// A request to provision a new disposable server.
    Provision(ProvisionRequest),
}

/// Description of an already-running server supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalServer {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Logical database to connect to.
    pub database: String,
}

impl ExternalServer {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Field {
                field: "host",
                reason: "must not be empty".to_string(),
            });
        }
        validate_identifier("user", &self.user)?;
        validate_identifier("database", &self.database)?;
        Ok(())
    }
}

/// Request to provision a new server. Unspecified identity fields are
/// synthesized with a collision-resistant suffix at setup time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    /// Provisioning strategy.
    pub strategy: ServerStrategy,

    /// Server version hint passed through to the strategy (e.g. an image
    /// tag for the container strategy).
    #[serde(default)]
    pub version: Option<String>,

    /// Host port to expose. `0` (the default) asks for an ephemeral port.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Exact database name, when the caller needs a fixed one.
    #[serde(default)]
    pub database_name: Option<String>,

    /// Prefix for the generated database name.
    #[serde(default)]
    pub database_name_prefix: Option<String>,

    /// Prefix for the generated server instance name.
    #[serde(default)]
    pub server_name_prefix: Option<String>,
}

impl ProvisionRequest {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(user) = &self.user {
            validate_identifier("user", user)?;
        }
        if let Some(name) = &self.database_name {
            validate_identifier("database name", name)?;
        }
        if let Some(prefix) = &self.database_name_prefix {
            validate_identifier("database name prefix", prefix)?;
        }
        if let Some(prefix) = &self.server_name_prefix {
            validate_identifier("server name prefix", prefix)?;
        }
        Ok(())
    }
}

/// Named server-provisioning strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStrategy {
    /// Start a disposable database container via the container runtime.
    Container,
}

impl ServerStrategy {
    /// The config tag for this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
        }
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Creation hints for the fresh logical database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Prefix for the generated database name.
    #[serde(default)]
    pub prefix: Option<String>,
}

// ---------------------------------------------------------------------------
// Migrate
// ---------------------------------------------------------------------------

/// Migration request.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrateConfig {
    /// Migration strategy.
    pub strategy: MigrateStrategy,

    /// Root directory the strategy reads migration units from.
    pub root: PathBuf,
}

/// Named migration strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrateStrategy {
    /// Apply `*.sql` files from the root directory in filename order.
    Sql,
}

impl MigrateStrategy {
    /// The config tag for this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
        }
    }
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// Seed data: tables in insertion order, each with rows in insertion
/// order. Both orders are caller-significant (foreign keys), which is why
/// this is a list and not a map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SeedConfig {
    pub tables: Vec<SeedTable>,
}

impl SeedConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::with_capacity(self.tables.len());
        for table in &self.tables {
            validate_table_name("seed table", &table.table)?;
            if !seen.insert(table.table.as_str()) {
                return Err(ConfigError::DuplicateSeedTable(table.table.clone()));
            }
        }
        Ok(())
    }
}

/// Rows to insert into one table.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedTable {
    pub table: String,
    #[serde(default)]
    pub rows: Vec<SeedRow>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
