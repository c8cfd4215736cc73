//! Activity log entries recorded against a lead.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Role;

/// Kind of event recorded in the activity log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    LeadCreated,
    LeadStatusChanged,
    InstallerAssigned,
    StepCompleted,
    StepHalted,
    StepSkipped,
    StepReopened,
    DocumentUploaded,
    DocumentSubmitted,
    DocumentCorrupted,
    DocumentDeleted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::LeadCreated => "lead_created",
            ActivityAction::LeadStatusChanged => "lead_status_changed",
            ActivityAction::InstallerAssigned => "installer_assigned",
            ActivityAction::StepCompleted => "step_completed",
            ActivityAction::StepHalted => "step_halted",
            ActivityAction::StepSkipped => "step_skipped",
            ActivityAction::StepReopened => "step_reopened",
            ActivityAction::DocumentUploaded => "document_uploaded",
            ActivityAction::DocumentSubmitted => "document_submitted",
            ActivityAction::DocumentCorrupted => "document_corrupted",
            ActivityAction::DocumentDeleted => "document_deleted",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead_created" => Ok(ActivityAction::LeadCreated),
            "lead_status_changed" => Ok(ActivityAction::LeadStatusChanged),
            "installer_assigned" => Ok(ActivityAction::InstallerAssigned),
            "step_completed" => Ok(ActivityAction::StepCompleted),
            "step_halted" => Ok(ActivityAction::StepHalted),
            "step_skipped" => Ok(ActivityAction::StepSkipped),
            "step_reopened" => Ok(ActivityAction::StepReopened),
            "document_uploaded" => Ok(ActivityAction::DocumentUploaded),
            "document_submitted" => Ok(ActivityAction::DocumentSubmitted),
            "document_corrupted" => Ok(ActivityAction::DocumentCorrupted),
            "document_deleted" => Ok(ActivityAction::DocumentDeleted),
            _ => Err(format!("Invalid activity action: {s}")),
        }
    }
}

/// One row of a lead's activity log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: u64,
    pub lead_id: u64,
    pub actor: String,
    pub actor_role: Role,
    pub action: ActivityAction,
    /// Short machine-generated description of what changed
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub created_at: Timestamp,
}
