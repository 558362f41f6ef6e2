//! Configuration-level errors.
//!
//! Raised by [`crate::config::ProvisionConfig::validate`] before any
//! resource is acquired. Phase and collaborator errors live with the code
//! that produces them.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A caller-supplied identifier or prefix broke the naming rules.
    #[error("Invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },

    /// The same table appears more than once in the seed configuration.
    #[error("Duplicate seed table: \"{0}\"")]
    DuplicateSeedTable(String),
}
