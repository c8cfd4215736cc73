//! Status enumerations for leads, step instances and documents.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Overall lifecycle status of a lead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum LeadStatus {
    /// Fresh enquiry
    #[default]
    #[serde(rename = "lead")]
    Lead,
    /// Customer has shown interest
    #[serde(rename = "lead_interested")]
    Interested,
    /// Customer profile submitted, project under way
    #[serde(rename = "lead_processing")]
    Processing,
    /// Project finished
    #[serde(rename = "lead_completed")]
    Completed,
    /// Project abandoned
    #[serde(rename = "lead_cancelled")]
    Cancelled,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::Lead,
        LeadStatus::Interested,
        LeadStatus::Processing,
        LeadStatus::Completed,
        LeadStatus::Cancelled,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Lead => "lead",
            LeadStatus::Interested => "lead_interested",
            LeadStatus::Processing => "lead_processing",
            LeadStatus::Completed => "lead_completed",
            LeadStatus::Cancelled => "lead_cancelled",
        }
    }

    /// Completed and cancelled leads are closed: no outgoing transitions, and
    /// only admin may still act on their steps.
    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStatus::Completed | LeadStatus::Cancelled)
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lead" | "new" => Ok(LeadStatus::Lead),
            "lead_interested" | "interested" => Ok(LeadStatus::Interested),
            "lead_processing" | "processing" => Ok(LeadStatus::Processing),
            "lead_completed" | "completed" => Ok(LeadStatus::Completed),
            "lead_cancelled" | "cancelled" | "canceled" => Ok(LeadStatus::Cancelled),
            _ => Err(format!("Invalid lead status: {s}")),
        }
    }
}

/// Status of one lead's step instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Completed,
    Halted,
    Skipped,
}

impl StepStatus {
    pub const ALL: [StepStatus; 4] = [
        StepStatus::Pending,
        StepStatus::Completed,
        StepStatus::Halted,
        StepStatus::Skipped,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Completed => "completed",
            StepStatus::Halted => "halted",
            StepStatus::Skipped => "skipped",
        }
    }

    /// Get status with a leading icon for timeline display.
    ///
    /// ```rust
    /// use helios_core::models::StepStatus;
    ///
    /// assert_eq!(StepStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(StepStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            StepStatus::Pending => "○ Pending",
            StepStatus::Completed => "✓ Completed",
            StepStatus::Halted => "■ Halted",
            StepStatus::Skipped => "» Skipped",
        }
    }
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(StepStatus::Pending),
            "completed" | "done" => Ok(StepStatus::Completed),
            "halted" => Ok(StepStatus::Halted),
            "skipped" => Ok(StepStatus::Skipped),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}

/// Verification state of an uploaded document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Valid,
    Corrupted,
    Replaced,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 3] = [
        DocumentStatus::Valid,
        DocumentStatus::Corrupted,
        DocumentStatus::Replaced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Valid => "valid",
            DocumentStatus::Corrupted => "corrupted",
            DocumentStatus::Replaced => "replaced",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "valid" => Ok(DocumentStatus::Valid),
            "corrupted" => Ok(DocumentStatus::Corrupted),
            "replaced" => Ok(DocumentStatus::Replaced),
            _ => Err(format!("Invalid document status: {s}")),
        }
    }
}
