//! Timeline orchestration for a single lead.
//!
//! Builds the ordered step list an actor sees, works out which step is next,
//! and models the completion dialog with its per-document actions.

use jiff::Timestamp;
use serde::Serialize;

use super::{engine, FulfillmentReport};
use crate::models::{
    Actor, Document, Lead, RequiredDocument, StepDefinition, StepInstance, StepStatus,
    SubmissionType,
};

/// One row of a lead's timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub definition: StepDefinition,
    pub instance: StepInstance,
    /// Whether the actor may edit or complete this step
    pub can_act: bool,
    /// Whether this is the next actionable step
    pub is_next: bool,
}

/// Completed steps out of all steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Whole percentage, rounded down. An empty timeline is 0%.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (self.completed * 100 / self.total) as u32
        }
    }
}

/// The ordered steps of one lead as seen by one actor.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub lead: Lead,
    pub entries: Vec<TimelineEntry>,
    pub progress: Progress,
}

impl Timeline {
    /// Joins definitions with the lead's instances in template order.
    ///
    /// Definitions without an instance and orphaned instances are left out;
    /// callers instantiate missing steps first (see [`missing_instances`]).
    pub fn build(
        lead: Lead,
        definitions: &[StepDefinition],
        instances: &[StepInstance],
        actor: &Actor,
    ) -> Self {
        let mut ordered: Vec<&StepDefinition> = definitions.iter().collect();
        ordered.sort_by_key(|definition| definition.order_index);

        let mut entries: Vec<TimelineEntry> = ordered
            .into_iter()
            .filter_map(|definition| {
                let instance = instances
                    .iter()
                    .find(|instance| instance.definition_id == Some(definition.id))?;
                Some(TimelineEntry {
                    definition: definition.clone(),
                    instance: instance.clone(),
                    can_act: engine::check_access(actor, &lead, definition).is_ok(),
                    is_next: false,
                })
            })
            .collect();

        let statuses: Vec<StepStatus> = entries.iter().map(|e| e.instance.status).collect();
        if let Some(index) = next_actionable_index(&statuses) {
            entries[index].is_next = true;
        }

        let progress = Progress {
            completed: statuses
                .iter()
                .filter(|status| **status == StepStatus::Completed)
                .count(),
            total: statuses.len(),
        };

        Self {
            lead,
            entries,
            progress,
        }
    }

    /// The first pending step whose predecessors are all completed.
    pub fn next_actionable(&self) -> Option<&TimelineEntry> {
        self.entries.iter().find(|entry| entry.is_next)
    }

    pub fn entry(&self, definition_id: u64) -> Option<&TimelineEntry> {
        self.entries
            .iter()
            .find(|entry| entry.definition.id == definition_id)
    }
}

/// Index of the first pending status preceded only by completed ones.
///
/// A halted or skipped step blocks everything after it.
pub fn next_actionable_index(statuses: &[StepStatus]) -> Option<usize> {
    let index = statuses
        .iter()
        .position(|status| *status != StepStatus::Completed)?;
    (statuses[index] == StepStatus::Pending).then_some(index)
}

/// Pending instances for every definition the lead does not have yet.
pub fn missing_instances(
    lead_id: u64,
    definitions: &[StepDefinition],
    instances: &[StepInstance],
    now: Timestamp,
) -> Vec<StepInstance> {
    definitions
        .iter()
        .filter(|definition| {
            !instances
                .iter()
                .any(|instance| instance.definition_id == Some(definition.id))
        })
        .map(|definition| StepInstance::pending(lead_id, definition, now))
        .collect()
}

/// Action a front end offers for one required document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentAction {
    FillForm,
    UploadFile,
    View,
    Delete,
}

impl DocumentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentAction::FillForm => "fill_form",
            DocumentAction::UploadFile => "upload_file",
            DocumentAction::View => "view",
            DocumentAction::Delete => "delete",
        }
    }
}

/// One required document as shown in the completion dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogRequirement {
    pub requirement: RequiredDocument,
    pub satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<u64>,
    pub actions: Vec<DocumentAction>,
}

/// What the completion dialog shows for one step of one lead.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionDialog {
    pub lead_id: u64,
    pub definition_id: u64,
    pub step_name: String,
    pub status: StepStatus,
    pub version: u64,
    pub can_act: bool,
    pub remarks_required: bool,
    pub attachments_allowed: bool,
    pub customer_upload: bool,
    pub requires_installer_assignment: bool,
    pub installer_assigned: bool,
    pub requirements: Vec<DialogRequirement>,
}

impl CompletionDialog {
    /// Builds the dialog from a fresh read of the lead's documents.
    pub fn open(
        actor: &Actor,
        lead: &Lead,
        definition: &StepDefinition,
        instance: &StepInstance,
        documents: &[Document],
    ) -> Self {
        let report = FulfillmentReport::check(definition, documents);
        let requirements = report
            .requirements
            .into_iter()
            .map(|status| {
                let actions = if status.satisfied {
                    vec![DocumentAction::View, DocumentAction::Delete]
                } else {
                    match status.requirement.submission_type {
                        SubmissionType::Form => vec![DocumentAction::FillForm],
                        SubmissionType::File => vec![DocumentAction::UploadFile],
                    }
                };
                DialogRequirement {
                    requirement: status.requirement,
                    satisfied: status.satisfied,
                    document_id: status.document_id,
                    actions,
                }
            })
            .collect();

        Self {
            lead_id: lead.id,
            definition_id: definition.id,
            step_name: definition.name.clone(),
            status: instance.status,
            version: instance.version,
            can_act: engine::check_access(actor, lead, definition).is_ok(),
            remarks_required: definition.remarks_required,
            attachments_allowed: definition.attachments_allowed,
            customer_upload: definition.customer_upload,
            requires_installer_assignment: definition.requires_installer_assignment,
            installer_assigned: lead.has_installer(),
            requirements,
        }
    }

    pub fn all_documents_satisfied(&self) -> bool {
        self.requirements.iter().all(|r| r.satisfied)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{DocumentCategory, DocumentStatus, LeadStatus, Role};

    fn ts() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn lead(status: LeadStatus) -> Lead {
        Lead {
            id: 5,
            customer_name: "Ravi Kumar".to_string(),
            phone: Some("+91 98450 00000".to_string()),
            address: None,
            status,
            installer: None,
            version: 0,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn definition(id: u64, order_index: u32, roles: &[Role]) -> StepDefinition {
        StepDefinition {
            id,
            name: format!("Step {order_index}"),
            description: None,
            order_index,
            allowed_roles: roles.iter().copied().collect::<BTreeSet<_>>(),
            remarks_required: false,
            attachments_allowed: false,
            customer_upload: false,
            requires_installer_assignment: false,
            required_documents: Vec::new(),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn instance(definition: &StepDefinition, status: StepStatus) -> StepInstance {
        let mut instance = StepInstance::pending(5, definition, ts());
        instance.id = definition.id * 100;
        instance.status = status;
        instance
    }

    #[test]
    fn test_next_actionable_index() {
        use StepStatus::*;
        assert_eq!(next_actionable_index(&[]), None);
        assert_eq!(next_actionable_index(&[Pending, Pending]), Some(0));
        assert_eq!(next_actionable_index(&[Completed, Pending, Pending]), Some(1));
        assert_eq!(next_actionable_index(&[Completed, Completed]), None);
        assert_eq!(next_actionable_index(&[Completed, Skipped, Pending]), None);
        assert_eq!(next_actionable_index(&[Halted, Pending]), None);
    }

    #[test]
    fn test_build_orders_by_definition_and_computes_progress() {
        let first = definition(1, 1, &[Role::Sales]);
        let second = definition(2, 2, &[Role::Installer]);
        let third = definition(3, 3, &[Role::Sales]);
        // Deliberately out of order.
        let definitions = vec![third.clone(), first.clone(), second.clone()];
        let instances = vec![
            instance(&second, StepStatus::Pending),
            instance(&first, StepStatus::Completed),
            instance(&third, StepStatus::Pending),
        ];

        let timeline = Timeline::build(
            lead(LeadStatus::Processing),
            &definitions,
            &instances,
            &Actor::new("s1", Role::Sales),
        );

        let ids: Vec<u64> = timeline.entries.iter().map(|e| e.definition.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(timeline.next_actionable().map(|e| e.definition.id), Some(2));
        assert_eq!(timeline.progress, Progress { completed: 1, total: 3 });
        assert_eq!(timeline.progress.percent(), 33);

        let can_act: Vec<bool> = timeline.entries.iter().map(|e| e.can_act).collect();
        assert_eq!(can_act, vec![true, false, true]);
    }

    #[test]
    fn test_closed_lead_only_admin_can_act() {
        let first = definition(1, 1, &[Role::Office]);
        let instances = vec![instance(&first, StepStatus::Pending)];

        let office = Timeline::build(
            lead(LeadStatus::Cancelled),
            &[first.clone()],
            &instances,
            &Actor::new("o", Role::Office),
        );
        assert!(!office.entries[0].can_act);

        let admin = Timeline::build(
            lead(LeadStatus::Cancelled),
            &[first],
            &instances,
            &Actor::new("a", Role::Admin),
        );
        assert!(admin.entries[0].can_act);
    }

    #[test]
    fn test_missing_instances_are_pending() {
        let first = definition(1, 1, &[Role::Sales]);
        let second = definition(2, 2, &[Role::Sales]);
        let existing = vec![instance(&first, StepStatus::Completed)];

        let created = missing_instances(5, &[first, second], &existing, ts());
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].definition_id, Some(2));
        assert_eq!(created[0].status, StepStatus::Pending);
        assert_eq!(created[0].completed_by, None);
    }

    #[test]
    fn test_empty_timeline_progress() {
        let timeline = Timeline::build(
            lead(LeadStatus::Lead),
            &[],
            &[],
            &Actor::new("a", Role::Admin),
        );
        assert!(timeline.entries.is_empty());
        assert_eq!(timeline.progress.percent(), 0);
        assert!(timeline.next_actionable().is_none());
    }

    #[test]
    fn test_completion_dialog_actions() {
        let mut step = definition(1, 1, &[Role::Office]);
        step.required_documents = vec![
            RequiredDocument::file(DocumentCategory::AadhaarFront),
            RequiredDocument::form(DocumentCategory::Profile),
            RequiredDocument::file(DocumentCategory::PanCard),
        ];
        let documents = vec![Document {
            id: 42,
            lead_id: 5,
            category: DocumentCategory::AadhaarFront,
            file_name: "front.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            size_bytes: 2048,
            is_submitted: true,
            status: DocumentStatus::Valid,
            uploaded_by: "o".to_string(),
            created_at: ts(),
            updated_at: ts(),
        }];

        let dialog = CompletionDialog::open(
            &Actor::new("o", Role::Office),
            &lead(LeadStatus::Interested),
            &step,
            &instance(&step, StepStatus::Pending),
            &documents,
        );

        assert!(dialog.can_act);
        assert!(!dialog.installer_assigned);
        assert!(!dialog.all_documents_satisfied());
        assert_eq!(
            dialog.requirements[0].actions,
            vec![DocumentAction::View, DocumentAction::Delete]
        );
        assert_eq!(dialog.requirements[0].document_id, Some(42));
        assert_eq!(dialog.requirements[1].actions, vec![DocumentAction::FillForm]);
        assert_eq!(dialog.requirements[2].actions, vec![DocumentAction::UploadFile]);
    }
}
