//! Core library for the Helios solar lead timeline.
//!
//! Every customer project ("lead") moves through one universal template of
//! admin-configured steps. This crate holds the rules for that journey and
//! the storage behind it:
//!
//! - [`models`]: leads, step definitions and instances, documents, roles
//! - [`workflow`]: the pure rules (vocabulary, registry, fulfillment,
//!   transition engine, timeline)
//! - [`db`]: SQLite persistence with version-checked writes
//! - [`tracker`]: the async facade used by the CLI and the MCP server
//! - [`display`]: markdown rendering of everything above
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use helios_core::{
//!     models::{Actor, Role},
//!     params::{CreateLead, Id, StepTransition},
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
//!     .create_lead(&admin, &CreateLead {
//!         customer_name: "Meera Iyer".to_string(),
//!         phone: None,
//!         address: None,
//!     })
//!     .await?;
//!
//! let timeline = tracker.timeline(&admin, &Id { id: lead.id }).await?;
//! if let Some(next) = timeline.next_actionable() {
//!     let result = tracker
//!         .complete_step(&admin, &StepTransition {
//!             lead_id: lead.id,
//!             definition_id: next.definition.id,
//!             remarks: Some("Roof inspected".to_string()),
//!             ..Default::default()
//!         })
//!         .await;
//!     if let Err(e) = result {
//!         println!("Refused: {e}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod tracker;
pub mod workflow;

// Re-export commonly used types
pub use db::Database;
pub use display::{
    ActivityLog, CreateResult, DeleteResult, Definitions, Documents, Leads, LocalDateTime,
    OperationStatus, TransitionResult, UpdateResult,
};
pub use error::{Rejection, RejectionKind, Result, WorkflowError};
pub use models::{
    ActivityEntry, Actor, Document, DocumentCategory, DocumentStatus, Lead, LeadStatus,
    RequiredDocument, Role, StepAction, StepDefinition, StepInstance, StepStatus,
};
pub use params::{
    Acting, AssignInstaller, ChangeLeadStatus, CreateDefinition, CreateLead, EditDefinition, Id,
    ListLeads, ReorderDefinitions, StepRef, StepTransition, UploadDocument,
};
pub use tracker::{Tracker, TrackerBuilder};
pub use workflow::{
    CompletionDialog, FulfillmentReport, StatusVocabulary, Timeline, TimelineEntry,
};
