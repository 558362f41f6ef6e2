//! Identifier synthesis and naming rules for provisioned servers.
//!
//! Parallel test runs provision servers concurrently, so every default
//! identifier carries a collision-resistant random suffix. The suffix
//! source is a trait so tests can substitute a deterministic one.

use rand::Rng;

use crate::config::ProvisionRequest;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the random suffix appended to generated names.
pub const SUFFIX_LENGTH: usize = 12;

/// Length of a generated password.
pub const PASSWORD_LENGTH: usize = 24;

/// Maximum length of a database-side identifier. Matches the 63-byte name
/// limit common across server implementations.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Server name prefix used when the caller supplies none.
pub const DEFAULT_SERVER_NAME_PREFIX: &str = "seedbed";

/// Database name prefix used when the caller supplies none.
pub const DEFAULT_DATABASE_PREFIX: &str = "test";

// ---------------------------------------------------------------------------
// Suffix source
// ---------------------------------------------------------------------------

/// Source of per-call identifier suffixes.
///
/// Production code uses [`RandomSuffix`]. Tests can inject a sequential
/// source to make generated names predictable.
pub trait SuffixSource: Send + Sync {
    /// Produce one suffix. Each call must be independent; two concurrent
    /// setup calls must never observe the same value in practice.
    fn suffix(&self) -> String;
}

/// Draws lowercase alphanumeric suffixes from the thread RNG.
#[derive(Debug, Default)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn suffix(&self) -> String {
        rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(SUFFIX_LENGTH)
            .map(char::from)
            .collect::<String>()
            .to_lowercase()
    }
}

/// Generate a random password for a provisioned server.
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Server identity
// ---------------------------------------------------------------------------

/// Fully-resolved identity for a server about to be provisioned.
///
/// Every field is concrete: unspecified request fields have been filled
/// with suffixed defaults, so downstream code never re-checks options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    /// Name given to the backing server instance (e.g. the container).
    pub server_name: String,
    /// Logical database to connect to once the server is up.
    pub database: String,
    /// Connection user.
    pub user: String,
    /// Connection password.
    pub password: String,
    /// Requested port. `0` asks the runtime for an ephemeral port.
    pub port: u16,
}

impl ServerIdentity {
    /// Resolve a provisioning request into a concrete identity.
    ///
    /// All generated names share one suffix per call; explicitly supplied
    /// fields are taken verbatim.
    pub fn resolve(request: &ProvisionRequest, suffixes: &dyn SuffixSource) -> Self {
        let suffix = suffixes.suffix();

        let server_prefix = request
            .server_name_prefix
            .as_deref()
            .unwrap_or(DEFAULT_SERVER_NAME_PREFIX);
        let database_prefix = request
            .database_name_prefix
            .as_deref()
            .unwrap_or(DEFAULT_DATABASE_PREFIX);

        Self {
            server_name: format!("{server_prefix}-{suffix}"),
            database: request
                .database_name
                .clone()
                .unwrap_or_else(|| format!("{database_prefix}_{suffix}")),
            user: request
                .user
                .clone()
                .unwrap_or_else(|| format!("user_{suffix}")),
            password: request.password.clone().unwrap_or_else(generate_password),
            port: request.port.unwrap_or(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Naming rules
// ---------------------------------------------------------------------------

/// Validate a database-side identifier (database name, user, prefix).
///
/// Rules:
/// - Must not be empty.
/// - Must not exceed [`MAX_IDENTIFIER_LENGTH`] characters.
/// - Must contain only alphanumeric, hyphen, or underscore characters.
///
/// Identifiers end up spliced into statements such as `CREATE DATABASE`,
/// so the character set is restricted rather than escaped.
pub fn validate_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Field {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::Field {
            field,
            reason: format!("must not exceed {MAX_IDENTIFIER_LENGTH} characters"),
        });
    }
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Field {
            field,
            reason: "may only contain alphanumeric, hyphen, or underscore characters".to_string(),
        });
    }
    Ok(())
}

/// Validate a seed table name. Same rules as [`validate_identifier`],
/// plus `.` to allow schema-qualified names.
pub fn validate_table_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Field {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Field {
            field,
            reason: "may only contain alphanumeric, hyphen, underscore, or dot characters"
                .to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
