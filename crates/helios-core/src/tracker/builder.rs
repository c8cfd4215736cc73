//! Builder for creating and configuring Tracker instances.

use std::path::{Path, PathBuf};

use log::debug;
use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    error::{Result, WorkflowError},
    workflow::StatusVocabulary,
};

/// Builder for creating and configuring Tracker instances.
#[derive(Debug, Clone)]
pub struct TrackerBuilder {
    database_path: Option<PathBuf>,
    vocabulary: Option<StatusVocabulary>,
}

impl TrackerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            vocabulary: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/helios/helios.db` or `~/.local/share/helios/helios.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces the standard status vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: StatusVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Builds the configured tracker instance.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::FileSystem` if the database directory cannot be
    /// created.
    /// Returns `WorkflowError::Database` if database initialization fails.
    pub async fn build(self) -> Result<Tracker> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| WorkflowError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), WorkflowError>(())
        })
        .await
        .map_err(|e| WorkflowError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        debug!("Using database at {}", db_path.display());

        Ok(Tracker::new(
            db_path,
            self.vocabulary.unwrap_or_else(StatusVocabulary::standard),
        ))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("helios")
            .place_data_file("helios.db")
            .map_err(|e| WorkflowError::XdgDirectory(e.to_string()))
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
