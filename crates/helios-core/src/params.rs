//! Parameter structures for Helios operations
//!
//! These structures are shared by every interface (CLI, MCP) and carry no
//! framework-specific derives beyond serde. Interfaces wrap them with their
//! own derives and convert with `.into()`:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! JSON schema derives are only compiled with the `schema` feature.
//!
//! The acting user is never part of these structures. Tracker methods take
//! an [`Actor`] next to the parameters; MCP requests carry it through
//! [`Acting`].

use std::collections::BTreeSet;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, WorkflowError},
    models::{Actor, DocumentCategory, LeadStatus, RequiredDocument, Role, StepAction},
    workflow::StepRequest,
};

/// Generic parameters for operations requiring just an ID.
///
/// Used for get_lead, lead_activity, list_documents, delete_definition and
/// the document status operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters plus the user performing the operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Acting<T> {
    /// The acting user and their role
    pub actor: Actor,
    #[serde(flatten)]
    pub params: T,
}

/// Parameters for creating a new lead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateLead {
    /// Customer name (required)
    pub customer_name: String,
    /// Optional contact phone number
    pub phone: Option<String>,
    /// Optional installation address
    pub address: Option<String>,
}

impl CreateLead {
    pub fn validate(&self) -> Result<()> {
        if self.customer_name.trim().is_empty() {
            return Err(WorkflowError::invalid_input(
                "customer_name",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Parameters for listing leads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListLeads {
    /// Only return leads in this status
    #[serde(default)]
    pub status: Option<LeadStatus>,
}

/// Parameters for a manual lead status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ChangeLeadStatus {
    pub lead_id: u64,
    /// Target status; must be reachable from the current one
    pub status: LeadStatus,
    /// Optional remarks recorded in the activity log
    #[serde(default)]
    pub remarks: Option<String>,
    /// Lead version the caller last saw
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Parameters for assigning (or clearing) a lead's installer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AssignInstaller {
    pub lead_id: u64,
    /// Installer user reference; `None` clears the assignment
    pub installer: Option<String>,
}

/// Parameters for creating a step definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateDefinition {
    /// Step name (required)
    pub name: String,
    pub description: Option<String>,
    /// Roles besides admin that may act on the step
    pub allowed_roles: Vec<Role>,
    #[serde(default)]
    pub remarks_required: bool,
    #[serde(default)]
    pub attachments_allowed: bool,
    #[serde(default)]
    pub customer_upload: bool,
    #[serde(default)]
    pub requires_installer_assignment: bool,
    #[serde(default)]
    pub required_documents: Vec<RequiredDocument>,
    /// 1-based position; appended at the end when omitted
    #[serde(default)]
    pub position: Option<u32>,
}

impl CreateDefinition {
    pub fn role_set(&self) -> BTreeSet<Role> {
        self.allowed_roles.iter().copied().collect()
    }
}

/// Partial update of a step definition. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct EditDefinition {
    pub id: u64,
    pub name: Option<String>,
    /// New description; an empty string clears it
    pub description: Option<String>,
    pub allowed_roles: Option<Vec<Role>>,
    pub remarks_required: Option<bool>,
    pub attachments_allowed: Option<bool>,
    pub customer_upload: Option<bool>,
    pub requires_installer_assignment: Option<bool>,
    pub required_documents: Option<Vec<RequiredDocument>>,
}

impl EditDefinition {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.allowed_roles.is_none()
            && self.remarks_required.is_none()
            && self.attachments_allowed.is_none()
            && self.customer_upload.is_none()
            && self.requires_installer_assignment.is_none()
            && self.required_documents.is_none()
    }
}

/// Parameters for reordering every step definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReorderDefinitions {
    /// All definition ids in their new order
    pub ids: Vec<u64>,
}

/// Identifies one step of one lead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepRef {
    pub lead_id: u64,
    pub definition_id: u64,
}

/// Parameters for completing, halting, skipping or reopening a step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepTransition {
    pub lead_id: u64,
    pub definition_id: u64,
    /// Remarks; required to complete steps that demand them
    #[serde(default)]
    pub remarks: Option<String>,
    /// Attachment references, only accepted by steps that allow them
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Step instance version the caller last saw
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl StepTransition {
    pub fn step(&self) -> StepRef {
        StepRef {
            lead_id: self.lead_id,
            definition_id: self.definition_id,
        }
    }

    /// The engine request for `action`.
    pub fn request(&self, action: StepAction) -> StepRequest {
        StepRequest {
            action,
            remarks: self.remarks.clone(),
            attachments: self.attachments.clone(),
        }
    }
}

/// Parameters for recording an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UploadDocument {
    pub lead_id: u64,
    pub category: DocumentCategory,
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
    /// Submit the document immediately instead of keeping it as a draft
    #[serde(default)]
    pub submit: bool,
}

impl UploadDocument {
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(WorkflowError::invalid_input("file_name", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_lead_requires_name() {
        let params = CreateLead {
            customer_name: "  ".to_string(),
            ..Default::default()
        };
        match params.validate().unwrap_err() {
            WorkflowError::InvalidInput { field, .. } => assert_eq!(field, "customer_name"),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }

        let params = CreateLead {
            customer_name: "Anita Rao".to_string(),
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_edit_definition_is_empty() {
        let mut params = EditDefinition {
            id: 3,
            ..Default::default()
        };
        assert!(params.is_empty());
        params.remarks_required = Some(true);
        assert!(!params.is_empty());
    }

    #[test]
    fn test_step_transition_request() {
        let params = StepTransition {
            lead_id: 1,
            definition_id: 2,
            remarks: Some("Inspection passed".to_string()),
            attachments: vec!["photo-1.jpg".to_string()],
            expected_version: None,
        };
        let request = params.request(StepAction::Complete);
        assert_eq!(request.action, StepAction::Complete);
        assert_eq!(request.trimmed_remarks(), Some("Inspection passed"));
        assert_eq!(request.attachments, vec!["photo-1.jpg".to_string()]);
        assert_eq!(params.step().definition_id, 2);
    }

    #[test]
    fn test_acting_flattens_params() {
        let json = r#"{
            "actor": {"user": "office-1", "role": "office"},
            "lead_id": 4,
            "definition_id": 9,
            "remarks": "done"
        }"#;
        let acting: Acting<StepTransition> = serde_json::from_str(json).unwrap();
        assert_eq!(acting.actor.role, Role::Office);
        assert_eq!(acting.params.lead_id, 4);
        assert_eq!(acting.params.definition_id, 9);
        assert!(acting.params.attachments.is_empty());
    }

    #[test]
    fn test_change_lead_status_deserializes_wire_names() {
        let params: ChangeLeadStatus =
            serde_json::from_str(r#"{"lead_id": 1, "status": "lead_completed"}"#).unwrap();
        assert_eq!(params.status, LeadStatus::Completed);
        assert_eq!(params.expected_version, None);
    }
}
