//! Data models for leads, step definitions, step instances and documents.
//!
//! This module contains the core domain types of the lead timeline. Display
//! implementations live in [`crate::display::models`] so that data structures
//! stay separate from presentation.
//!
//! # Ownership
//!
//! - A [`Lead`] exclusively owns its [`StepInstance`]s, [`Document`]s and
//!   [`ActivityEntry`]s.
//! - A [`StepDefinition`] is shared by every lead and referenced, not owned,
//!   by step instances.
//!
//! # Examples
//!
//! ```rust
//! use helios_core::models::{LeadStatus, Role, StepStatus};
//!
//! assert!(Role::Admin.is_admin());
//! assert_eq!(StepStatus::default(), StepStatus::Pending);
//! let status: LeadStatus = "lead_processing".parse().unwrap();
//! assert_eq!(status.as_str(), "lead_processing");
//! ```

pub mod activity;
pub mod document;
pub mod lead;
pub mod role;
pub mod status;
pub mod step;


pub use activity::{ActivityAction, ActivityEntry};
pub use document::{Document, DocumentCategory, ProcessType, RequiredDocument, SubmissionType};
pub use lead::Lead;
pub use role::{Actor, Role};
pub use status::{DocumentStatus, LeadStatus, StepStatus};
pub use step::{StepAction, StepDefinition, StepInstance};
