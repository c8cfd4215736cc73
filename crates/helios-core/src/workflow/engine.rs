//! Step and lead transition rules.
//!
//! Step transitions are guarded by an ordered list of named preconditions.
//! They are evaluated in sequence and the first failure wins, so callers get
//! one tagged [`Rejection`] rather than a bag of messages.
//!
//! ```text
//!            complete
//!   pending ─────────▶ completed ─┐
//!      │ ▲   halt                 │
//!      │ └──────────▶ halted   ───┤ reopen (admin)
//!      │     skip                 │
//!      └────────────▶ skipped  ───┘
//! ```

use jiff::Timestamp;
use log::debug;

use super::{FulfillmentReport, StatusVocabulary};
use crate::{
    error::Rejection,
    models::{Actor, Lead, LeadStatus, StepAction, StepDefinition, StepInstance, StepStatus},
};

/// Everything the preconditions look at for one requested step action.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub actor: &'a Actor,
    pub lead: &'a Lead,
    pub definition: &'a StepDefinition,
    pub instance: &'a StepInstance,
    pub fulfillment: &'a FulfillmentReport,
}

/// A requested step action with the data the actor supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    pub action: StepAction,
    pub remarks: Option<String>,
    pub attachments: Vec<String>,
}

impl StepRequest {
    pub fn new(action: StepAction) -> Self {
        Self {
            action,
            remarks: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Remarks with surrounding whitespace removed; blank counts as absent.
    pub fn trimmed_remarks(&self) -> Option<&str> {
        self.remarks
            .as_deref()
            .map(str::trim)
            .filter(|remarks| !remarks.is_empty())
    }
}

type Check = fn(&StepContext<'_>, &StepRequest) -> Result<(), Rejection>;

/// A named step precondition.
pub struct Precondition {
    pub name: &'static str,
    check: Check,
}

impl Precondition {
    pub fn check(&self, ctx: &StepContext<'_>, request: &StepRequest) -> Result<(), Rejection> {
        (self.check)(ctx, request)
    }
}

/// Step preconditions in evaluation order.
pub const STEP_PRECONDITIONS: [Precondition; 6] = [
    Precondition {
        name: "permission",
        check: check_permission,
    },
    Precondition {
        name: "project_closed",
        check: check_project_open,
    },
    Precondition {
        name: "state",
        check: check_state,
    },
    Precondition {
        name: "installer",
        check: check_installer,
    },
    Precondition {
        name: "remarks",
        check: check_remarks,
    },
    Precondition {
        name: "documents",
        check: check_documents,
    },
];

fn check_permission(ctx: &StepContext<'_>, request: &StepRequest) -> Result<(), Rejection> {
    let allowed = match request.action {
        StepAction::Reopen => ctx.actor.role.is_admin(),
        StepAction::Complete | StepAction::Halt | StepAction::Skip => {
            ctx.definition.permits(ctx.actor.role)
        }
    };
    if allowed {
        Ok(())
    } else {
        Err(Rejection::Permission {
            role: ctx.actor.role,
            action: format!("{} '{}'", request.action, ctx.definition.name),
        })
    }
}

fn check_project_open(ctx: &StepContext<'_>, _request: &StepRequest) -> Result<(), Rejection> {
    if ctx.lead.status.is_closed() && !ctx.actor.role.is_admin() {
        return Err(Rejection::ProjectClosed {
            status: ctx.lead.status,
        });
    }
    Ok(())
}

fn check_state(ctx: &StepContext<'_>, request: &StepRequest) -> Result<(), Rejection> {
    let from = ctx.instance.status;
    let valid = match request.action {
        StepAction::Complete | StepAction::Halt | StepAction::Skip => from == StepStatus::Pending,
        StepAction::Reopen => from != StepStatus::Pending,
    };
    if valid {
        Ok(())
    } else {
        Err(Rejection::InvalidStepTransition {
            action: request.action,
            from,
        })
    }
}

fn check_installer(ctx: &StepContext<'_>, request: &StepRequest) -> Result<(), Rejection> {
    if request.action == StepAction::Complete
        && ctx.definition.requires_installer_assignment
        && !ctx.lead.has_installer()
    {
        return Err(Rejection::MissingInstaller {
            step: ctx.definition.name.clone(),
        });
    }
    Ok(())
}

fn check_remarks(ctx: &StepContext<'_>, request: &StepRequest) -> Result<(), Rejection> {
    if request.action == StepAction::Complete
        && ctx.definition.remarks_required
        && request.trimmed_remarks().is_none()
    {
        return Err(Rejection::MissingRemarks {
            step: ctx.definition.name.clone(),
        });
    }
    Ok(())
}

fn check_documents(ctx: &StepContext<'_>, request: &StepRequest) -> Result<(), Rejection> {
    if request.action != StepAction::Complete {
        return Ok(());
    }
    let missing = ctx.fulfillment.missing();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Rejection::MissingDocument {
            categories: missing,
        })
    }
}

/// Rules that decide whether an actor may touch a step at all: role
/// membership and the closed-project lock.
pub fn check_access(
    actor: &Actor,
    lead: &Lead,
    definition: &StepDefinition,
) -> Result<(), Rejection> {
    if !definition.permits(actor.role) {
        return Err(Rejection::Permission {
            role: actor.role,
            action: format!("act on '{}'", definition.name),
        });
    }
    if lead.status.is_closed() && !actor.role.is_admin() {
        return Err(Rejection::ProjectClosed {
            status: lead.status,
        });
    }
    Ok(())
}

/// Runs every precondition in order and returns the first failure.
pub fn evaluate(ctx: &StepContext<'_>, request: &StepRequest) -> Result<(), Rejection> {
    for precondition in &STEP_PRECONDITIONS {
        if let Err(rejection) = precondition.check(ctx, request) {
            debug!(
                "{} on step '{}' of lead {} refused by '{}': {}",
                request.action, ctx.definition.name, ctx.lead.id, precondition.name, rejection
            );
            return Err(rejection);
        }
    }
    Ok(())
}

/// Evaluates the request and returns the instance as it should be stored.
pub fn apply(
    ctx: &StepContext<'_>,
    request: &StepRequest,
    now: Timestamp,
) -> Result<StepInstance, Rejection> {
    evaluate(ctx, request)?;

    let mut next = ctx.instance.clone();
    next.status = request.action.target_status();
    next.version = ctx.instance.version + 1;
    next.updated_at = now;

    match request.action {
        StepAction::Complete | StepAction::Halt | StepAction::Skip => {
            next.completed_by = Some(ctx.actor.user.clone());
            next.completed_at = Some(now);
            next.remarks = request.trimmed_remarks().map(String::from);
            next.attachments = request.attachments.clone();
        }
        StepAction::Reopen => {
            next.completed_by = None;
            next.completed_at = None;
            next.remarks = None;
            next.attachments = Vec::new();
        }
    }

    Ok(next)
}

/// Business events that move a lead's status as a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadEvent {
    /// The customer profile form was submitted and is valid
    ProfileSubmitted,
}

/// Validates a manual lead status change and returns the new status.
pub fn change_lead_status(
    vocabulary: &StatusVocabulary,
    actor: &Actor,
    lead: &Lead,
    target: LeadStatus,
) -> Result<LeadStatus, Rejection> {
    if !actor.role.manages_leads() {
        return Err(Rejection::Permission {
            role: actor.role,
            action: format!("change the status of lead {}", lead.id),
        });
    }
    if !vocabulary.allows_lead_transition(lead.status, target) {
        return Err(Rejection::InvalidLeadTransition {
            from: lead.status,
            to: target,
        });
    }
    Ok(target)
}

/// The status a lead moves to after `event`, or `None` when the event does
/// not affect it.
pub fn apply_lead_event(status: LeadStatus, event: LeadEvent) -> Option<LeadStatus> {
    match (event, status) {
        (LeadEvent::ProfileSubmitted, LeadStatus::Lead | LeadStatus::Interested) => {
            Some(LeadStatus::Processing)
        }
        (LeadEvent::ProfileSubmitted, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{
        error::RejectionKind,
        models::{Document, DocumentCategory, DocumentStatus, RequiredDocument, Role},
    };

    fn ts() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn lead(status: LeadStatus, installer: Option<&str>) -> Lead {
        Lead {
            id: 1,
            customer_name: "Asha Rao".to_string(),
            phone: None,
            address: None,
            status,
            installer: installer.map(String::from),
            version: 0,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn definition() -> StepDefinition {
        StepDefinition {
            id: 10,
            name: "Installation".to_string(),
            description: None,
            order_index: 1,
            allowed_roles: BTreeSet::from([Role::Installer, Role::Office]),
            remarks_required: false,
            attachments_allowed: true,
            customer_upload: false,
            requires_installer_assignment: false,
            required_documents: Vec::new(),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn doc(category: DocumentCategory) -> Document {
        Document {
            id: 3,
            lead_id: 1,
            category,
            file_name: "scan.jpg".to_string(),
            content_type: None,
            size_bytes: 10,
            is_submitted: true,
            status: DocumentStatus::Valid,
            uploaded_by: "office-1".to_string(),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn run(
        actor: &Actor,
        lead: &Lead,
        definition: &StepDefinition,
        instance: &StepInstance,
        documents: &[Document],
        request: &StepRequest,
    ) -> Result<StepInstance, Rejection> {
        let fulfillment = FulfillmentReport::check(definition, documents);
        let ctx = StepContext {
            actor,
            lead,
            definition,
            instance,
            fulfillment: &fulfillment,
        };
        apply(&ctx, request, ts())
    }

    #[test]
    fn test_precondition_order() {
        let names: Vec<_> = STEP_PRECONDITIONS.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "permission",
                "project_closed",
                "state",
                "installer",
                "remarks",
                "documents"
            ]
        );
    }

    #[test]
    fn test_complete_records_metadata() {
        let definition = definition();
        let lead = lead(LeadStatus::Processing, None);
        let instance = StepInstance::pending(1, &definition, ts());
        let actor = Actor::new("inst-7", Role::Installer);
        let request = StepRequest::new(StepAction::Complete)
            .with_remarks("  Panels mounted  ")
            .with_attachments(vec!["roof.jpg".to_string()]);

        let done = run(&actor, &lead, &definition, &instance, &[], &request).unwrap();
        assert_eq!(done.status, StepStatus::Completed);
        assert_eq!(done.completed_by.as_deref(), Some("inst-7"));
        assert_eq!(done.completed_at, Some(ts()));
        assert_eq!(done.remarks.as_deref(), Some("Panels mounted"));
        assert_eq!(done.attachments, vec!["roof.jpg".to_string()]);
        assert_eq!(done.version, instance.version + 1);
    }

    #[test]
    fn test_permission_checked_first() {
        let mut definition = definition();
        definition.remarks_required = true;
        definition.required_documents = vec![RequiredDocument::file(DocumentCategory::SitePhoto)];
        let lead = lead(LeadStatus::Completed, None);
        let instance = StepInstance::pending(1, &definition, ts());
        let actor = Actor::new("sales-1", Role::Sales);

        let err = run(
            &actor,
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Complete),
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Permission);
    }

    #[test]
    fn test_closed_project_blocks_non_admin() {
        let definition = definition();
        let lead = lead(LeadStatus::Cancelled, None);
        let instance = StepInstance::pending(1, &definition, ts());

        let err = run(
            &Actor::new("inst-7", Role::Installer),
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Skip),
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::ProjectClosed);

        let skipped = run(
            &Actor::new("root", Role::Admin),
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Skip),
        )
        .unwrap();
        assert_eq!(skipped.status, StepStatus::Skipped);
    }

    #[test]
    fn test_installer_required_regardless_of_other_preconditions() {
        let mut definition = definition();
        definition.requires_installer_assignment = true;
        let instance = StepInstance::pending(1, &definition, ts());
        let actor = Actor::new("office-1", Role::Office);
        let request = StepRequest::new(StepAction::Complete).with_remarks("ok");

        let err = run(
            &actor,
            &lead(LeadStatus::Processing, None),
            &definition,
            &instance,
            &[],
            &request,
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::MissingInstaller);

        let err = run(
            &actor,
            &lead(LeadStatus::Processing, Some("   ")),
            &definition,
            &instance,
            &[],
            &request,
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::MissingInstaller);

        assert!(run(
            &actor,
            &lead(LeadStatus::Processing, Some("SunFit Crew")),
            &definition,
            &instance,
            &[],
            &request,
        )
        .is_ok());
    }

    #[test]
    fn test_remarks_required_only_for_complete() {
        let mut definition = definition();
        definition.remarks_required = true;
        let lead = lead(LeadStatus::Processing, None);
        let instance = StepInstance::pending(1, &definition, ts());
        let actor = Actor::new("office-1", Role::Office);

        let err = run(
            &actor,
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Complete).with_remarks("   "),
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::MissingRemarks);
        assert!(err.to_string().contains("remarks required"));

        let halted = run(
            &actor,
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Halt),
        )
        .unwrap();
        assert_eq!(halted.status, StepStatus::Halted);
        assert_eq!(halted.remarks, None);
    }

    #[test]
    fn test_documents_checked_for_complete_only() {
        let mut definition = definition();
        definition.required_documents = vec![
            RequiredDocument::file(DocumentCategory::InstallationPhoto),
            RequiredDocument::form(DocumentCategory::CommissioningReport),
        ];
        let lead = lead(LeadStatus::Processing, None);
        let instance = StepInstance::pending(1, &definition, ts());
        let actor = Actor::new("inst-7", Role::Installer);
        let documents = vec![doc(DocumentCategory::InstallationPhoto)];

        let err = run(
            &actor,
            &lead,
            &definition,
            &instance,
            &documents,
            &StepRequest::new(StepAction::Complete),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Rejection::MissingDocument {
                categories: vec![DocumentCategory::CommissioningReport]
            }
        );

        let skipped = run(
            &actor,
            &lead,
            &definition,
            &instance,
            &documents,
            &StepRequest::new(StepAction::Skip).with_remarks("Customer declined"),
        )
        .unwrap();
        assert_eq!(skipped.status, StepStatus::Skipped);
        assert_eq!(skipped.remarks.as_deref(), Some("Customer declined"));

        let mut all = documents;
        all.push(doc(DocumentCategory::CommissioningReport));
        let done = run(
            &actor,
            &lead,
            &definition,
            &instance,
            &all,
            &StepRequest::new(StepAction::Complete),
        )
        .unwrap();
        assert_eq!(done.status, StepStatus::Completed);
    }

    #[test]
    fn test_state_edges() {
        let definition = definition();
        let lead = lead(LeadStatus::Processing, None);
        let mut instance = StepInstance::pending(1, &definition, ts());
        let admin = Actor::new("root", Role::Admin);

        let err = run(
            &admin,
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Reopen),
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::InvalidTransition);

        instance.status = StepStatus::Completed;
        let err = run(
            &admin,
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Halt),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Rejection::InvalidStepTransition {
                action: StepAction::Halt,
                from: StepStatus::Completed
            }
        );
    }

    #[test]
    fn test_reopen_clears_metadata_from_every_terminal_state() {
        let definition = definition();
        let lead = lead(LeadStatus::Processing, None);
        let admin = Actor::new("root", Role::Admin);

        for status in [StepStatus::Completed, StepStatus::Halted, StepStatus::Skipped] {
            let mut instance = StepInstance::pending(1, &definition, ts());
            instance.status = status;
            instance.completed_by = Some("inst-7".to_string());
            instance.completed_at = Some(ts());
            instance.remarks = Some("done".to_string());
            instance.attachments = vec!["a.jpg".to_string()];

            let reopened = run(
                &admin,
                &lead,
                &definition,
                &instance,
                &[],
                &StepRequest::new(StepAction::Reopen),
            )
            .unwrap();
            assert_eq!(reopened.status, StepStatus::Pending);
            assert_eq!(reopened.completed_by, None);
            assert_eq!(reopened.completed_at, None);
            assert_eq!(reopened.remarks, None);
            assert!(reopened.attachments.is_empty());
        }
    }

    #[test]
    fn test_reopen_is_admin_only() {
        let definition = definition();
        let lead = lead(LeadStatus::Processing, None);
        let mut instance = StepInstance::pending(1, &definition, ts());
        instance.status = StepStatus::Completed;

        let err = run(
            &Actor::new("office-1", Role::Office),
            &lead,
            &definition,
            &instance,
            &[],
            &StepRequest::new(StepAction::Reopen),
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Permission);
    }

    #[test]
    fn test_check_access() {
        let definition = definition();
        let open = lead(LeadStatus::Interested, None);
        let closed = lead(LeadStatus::Completed, None);

        assert!(check_access(&Actor::new("i", Role::Installer), &open, &definition).is_ok());
        assert_eq!(
            check_access(&Actor::new("c", Role::Customer), &open, &definition)
                .unwrap_err()
                .kind(),
            RejectionKind::Permission
        );
        assert_eq!(
            check_access(&Actor::new("i", Role::Installer), &closed, &definition)
                .unwrap_err()
                .kind(),
            RejectionKind::ProjectClosed
        );
        assert!(check_access(&Actor::new("a", Role::Admin), &closed, &definition).is_ok());
    }

    #[test]
    fn test_lead_status_rejects_targets_outside_adjacency() {
        let vocabulary = StatusVocabulary::standard();
        let admin = Actor::new("root", Role::Admin);

        for from in LeadStatus::ALL {
            for to in LeadStatus::ALL {
                let result = change_lead_status(&vocabulary, &admin, &lead(from, None), to);
                if vocabulary.lead_targets(from).contains(&to) {
                    assert_eq!(result, Ok(to));
                } else {
                    assert_eq!(
                        result,
                        Err(Rejection::InvalidLeadTransition { from, to }),
                        "{from:?} -> {to:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_lead_status_requires_office_or_admin() {
        let vocabulary = StatusVocabulary::standard();
        let lead = lead(LeadStatus::Lead, None);

        let err = change_lead_status(
            &vocabulary,
            &Actor::new("s", Role::Sales),
            &lead,
            LeadStatus::Interested,
        )
        .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Permission);

        assert!(change_lead_status(
            &vocabulary,
            &Actor::new("o", Role::Office),
            &lead,
            LeadStatus::Interested
        )
        .is_ok());
    }

    #[test]
    fn test_profile_submission_event() {
        assert_eq!(
            apply_lead_event(LeadStatus::Lead, LeadEvent::ProfileSubmitted),
            Some(LeadStatus::Processing)
        );
        assert_eq!(
            apply_lead_event(LeadStatus::Interested, LeadEvent::ProfileSubmitted),
            Some(LeadStatus::Processing)
        );
        for status in [
            LeadStatus::Processing,
            LeadStatus::Completed,
            LeadStatus::Cancelled,
        ] {
            assert_eq!(apply_lead_event(status, LeadEvent::ProfileSubmitted), None);
        }
    }
}
