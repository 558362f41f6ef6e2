//! Migration sources.
//!
//! A [`MigrationSource`] turns a root path into an ordered sequence of
//! migration units. [`SqlDirectorySource`] is the shipped implementation:
//! it reads `*.sql` files from one directory and orders them by filename,
//! so `001_init.sql` applies before `002_users.sql`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// One migration unit: a name and the statement body to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationUnit {
    /// Unit name, used in logs and in the applied-migration record. For
    /// file-based sources this is the filename.
    pub name: String,
    /// Statement body, executed verbatim.
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationSourceError {
    /// The root directory could not be read.
    #[error("Failed to read migration directory {root}: {source}")]
    ReadDir {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration file could not be read.
    #[error("Failed to read migration file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Produces an ordered sequence of migration units from a root path.
#[async_trait]
pub trait MigrationSource: Send + Sync {
    /// Load all units under `root` in application order. An empty source
    /// is not an error.
    async fn load(&self, root: &Path) -> Result<Vec<MigrationUnit>, MigrationSourceError>;
}

/// Reads `*.sql` files from a single directory, ordered by filename.
///
/// Entries without a `.sql` extension and subdirectories are ignored.
#[derive(Debug, Default)]
pub struct SqlDirectorySource;

#[async_trait]
impl MigrationSource for SqlDirectorySource {
    async fn load(&self, root: &Path) -> Result<Vec<MigrationUnit>, MigrationSourceError> {
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|source| MigrationSourceError::ReadDir {
                root: root.to_path_buf(),
                source,
            })?;

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| MigrationSourceError::ReadDir {
                    root: root.to_path_buf(),
                    source,
                })?;
            let Some(entry) = entry else { break };

            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
                continue;
            }
            let file_type = entry
                .file_type()
                .await
                .map_err(|source| MigrationSourceError::ReadDir {
                    root: root.to_path_buf(),
                    source,
                })?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push((name, path));
        }

        // Filename order is the application order.
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut units = Vec::with_capacity(files.len());
        for (name, path) in files {
            let body = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| MigrationSourceError::ReadFile { path, source })?;
            tracing::debug!(unit = %name, "Loaded migration unit");
            units.push(MigrationUnit { name, body });
        }

        Ok(units)
    }
}
