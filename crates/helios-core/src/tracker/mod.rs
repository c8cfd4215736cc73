//! High-level tracker API for leads, step definitions and timelines.
//!
//! [`Tracker`] is the async entry point every interface goes through. Each
//! operation opens its own SQLite connection on the blocking thread pool, so
//! a `Tracker` is cheap to share between tasks.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │     Tracker     │    │    Database     │    │    workflow     │
//! │  (async, ops)   │───▶│ (transactions)  │───▶│  (pure rules)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Tracker`] instances
//! - [`lead_ops`]: Lead intake, status changes and installer assignment
//! - [`definition_ops`]: Step definition administration
//! - [`step_ops`]: Timelines, the completion dialog and step transitions
//! - [`document_ops`]: Document register and fulfillment checks
//!
//! # Example
//!
//! ```rust,no_run
//! use helios_core::{
//!     models::{Actor, Role},
//!     params::{CreateLead, Id},
//!     TrackerBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = TrackerBuilder::new()
//!     .with_database_path(Some("helios.db"))
//!     .build()
//!     .await?;
//!
//! let admin = Actor::new("admin", Role::Admin);
//! tracker.seed_default_definitions(&admin).await?;
//!
//! let lead = tracker
//!     .create_lead(
//!         &admin,
//!         &CreateLead {
//!             customer_name: "Meera Iyer".to_string(),
//!             phone: None,
//!             address: Some("14 Lake Road, Pune".to_string()),
//!         },
//!     )
//!     .await?;
//!
//! let timeline = tracker.timeline(&admin, &Id { id: lead.id }).await?;
//! println!("{timeline}");
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, sync::Arc};

use tokio::task;

use crate::{
    db::Database,
    error::{Result, WorkflowError},
    workflow::StatusVocabulary,
};

pub mod builder;
pub mod definition_ops;
pub mod document_ops;
pub mod lead_ops;
pub mod step_ops;


pub use builder::TrackerBuilder;

/// Main tracker interface for the lead timeline.
#[derive(Debug, Clone)]
pub struct Tracker {
    pub(crate) db_path: PathBuf,
    vocabulary: Arc<StatusVocabulary>,
}

impl Tracker {
    pub(crate) fn new(db_path: PathBuf, vocabulary: StatusVocabulary) -> Self {
        Self {
            db_path,
            vocabulary: Arc::new(vocabulary),
        }
    }

    /// Labels, badge variants and lead transitions used by this tracker.
    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    /// Runs `op` against a fresh connection on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(|e| WorkflowError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
