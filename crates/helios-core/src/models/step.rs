//! Step definitions and per-lead step instances.

use std::{collections::BTreeSet, fmt, str::FromStr};

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{RequiredDocument, Role, StepStatus};

/// An admin-configured stage of the universal project template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepDefinition {
    pub id: u64,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Position in the template, dense from 1
    pub order_index: u32,

    /// Roles besides admin that may act on this step
    pub allowed_roles: BTreeSet<Role>,

    pub remarks_required: bool,

    pub attachments_allowed: bool,

    /// The customer uploads this step's documents themselves
    pub customer_upload: bool,

    pub requires_installer_assignment: bool,

    /// Documents that must be submitted and valid before completion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_documents: Vec<RequiredDocument>,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl StepDefinition {
    /// Admin always passes; everyone else needs to be listed.
    pub fn permits(&self, role: Role) -> bool {
        role.is_admin() || self.allowed_roles.contains(&role)
    }
}

/// One lead's realization of a [`StepDefinition`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepInstance {
    pub id: u64,

    pub lead_id: u64,

    /// `None` once the definition has been deleted
    pub definition_id: Option<u64>,

    /// Definition name at instantiation time, kept for orphaned history
    pub step_name: String,

    pub status: StepStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,

    /// Incremented on every write; used to detect concurrent updates
    pub version: u64,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl StepInstance {
    /// A fresh pending instance. Step instances never start in any other state.
    pub fn pending(lead_id: u64, definition: &StepDefinition, now: Timestamp) -> Self {
        Self {
            id: 0,
            lead_id,
            definition_id: Some(definition.id),
            step_name: definition.name.clone(),
            status: StepStatus::Pending,
            completed_by: None,
            completed_at: None,
            remarks: None,
            attachments: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Actions an actor can request on a step instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Complete,
    Halt,
    Skip,
    Reopen,
}

impl StepAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Complete => "complete",
            StepAction::Halt => "halt",
            StepAction::Skip => "skip",
            StepAction::Reopen => "reopen",
        }
    }

    /// Status a pending step lands in after this action.
    pub fn target_status(&self) -> StepStatus {
        match self {
            StepAction::Complete => StepStatus::Completed,
            StepAction::Halt => StepStatus::Halted,
            StepAction::Skip => StepStatus::Skipped,
            StepAction::Reopen => StepStatus::Pending,
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "complete" => Ok(StepAction::Complete),
            "halt" => Ok(StepAction::Halt),
            "skip" => Ok(StepAction::Skip),
            "reopen" => Ok(StepAction::Reopen),
            _ => Err(format!("Invalid step action: {s}")),
        }
    }
}
