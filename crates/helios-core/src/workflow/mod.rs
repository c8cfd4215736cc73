//! The pure workflow layer.
//!
//! Nothing in here touches storage. The [`crate::db`] layer loads rows, hands
//! them to these functions and writes back whatever they return, which keeps
//! every rule testable without a database.
//!
//! - [`vocabulary`]: labels, badge variants and the lead adjacency table
//! - [`registry`]: ordered step definitions and the default template
//! - [`fulfillment`]: required document checks
//! - [`engine`]: step preconditions, transitions and lead status changes
//! - [`timeline`]: per-lead timeline and the completion dialog

pub mod engine;
pub mod fulfillment;
pub mod registry;
pub mod timeline;
pub mod vocabulary;

pub use engine::{
    apply_lead_event, change_lead_status, check_access, LeadEvent, Precondition, StepContext,
    StepRequest, STEP_PRECONDITIONS,
};
pub use fulfillment::{FulfillmentReport, RequirementStatus};
pub use registry::{default_template, validate_definition, StepRegistry, TemplateStep};
pub use timeline::{
    missing_instances, next_actionable_index, CompletionDialog, DialogRequirement,
    DocumentAction, Progress, Timeline, TimelineEntry,
};
pub use vocabulary::{BadgeVariant, StatusVocabulary};
