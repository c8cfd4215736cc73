mod common;

use std::collections::BTreeMap;

use common::{admin, create_test_tracker, define, installer, new_lead, office, sales, step};
use helios_core::{
    models::{Actor, DocumentCategory, LeadStatus, RequiredDocument, Role, StepStatus},
    params::{
        AssignInstaller, ChangeLeadStatus, CreateDefinition, Id, StepRef, StepTransition,
        UploadDocument,
    },
    RejectionKind, StatusVocabulary, WorkflowError,
};

fn transition(lead_id: u64, definition_id: u64, remarks: Option<&str>) -> StepTransition {
    StepTransition {
        lead_id,
        definition_id,
        remarks: remarks.map(String::from),
        ..Default::default()
    }
}

fn upload(lead_id: u64, category: DocumentCategory, submit: bool) -> UploadDocument {
    UploadDocument {
        lead_id,
        category,
        file_name: format!("{}.pdf", category.as_str()),
        content_type: Some("application/pdf".to_string()),
        size_bytes: 2048,
        submit,
    }
}

#[tokio::test]
async fn test_remarks_required_step() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let survey = define(
        &tracker,
        CreateDefinition {
            remarks_required: true,
            ..step("Site Survey", &[Role::Sales])
        },
    )
    .await;
    let lead_id = new_lead(&tracker, "Anand Shetty").await;

    let err = tracker
        .complete_step(&sales(), &transition(lead_id, survey.id, Some("   ")))
        .await
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::MissingRemarks));

    let completed = tracker
        .complete_step(&sales(), &transition(lead_id, survey.id, Some("Inspection passed")))
        .await
        .expect("Complete should succeed with remarks");
    assert_eq!(completed.status, StepStatus::Completed);
    assert_eq!(completed.remarks.as_deref(), Some("Inspection passed"));
    assert_eq!(completed.completed_by.as_deref(), Some("sales-1"));
    assert!(completed.completed_at.is_some());
}

#[tokio::test]
async fn test_required_documents_gate_completion() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let kyc = define(
        &tracker,
        CreateDefinition {
            required_documents: vec![
                RequiredDocument::file(DocumentCategory::AadhaarFront),
                RequiredDocument::form(DocumentCategory::Profile),
            ],
            ..step("Customer Documentation", &[Role::Office])
        },
    )
    .await;
    let lead_id = new_lead(&tracker, "Lakshmi Menon").await;
    tracker
        .upload_document(&office(), &upload(lead_id, DocumentCategory::AadhaarFront, true))
        .await
        .unwrap();

    let report = tracker
        .check_documents(&StepRef {
            lead_id,
            definition_id: kyc.id,
        })
        .await
        .unwrap();
    assert_eq!(
        report.as_map(),
        BTreeMap::from([
            (DocumentCategory::AadhaarFront, true),
            (DocumentCategory::Profile, false),
        ])
    );

    let err = tracker
        .complete_step(&office(), &transition(lead_id, kyc.id, None))
        .await
        .unwrap_err();
    match err {
        WorkflowError::Rejected(rejection) => {
            assert!(rejection.to_string().contains("profile"), "{rejection}");
        }
        other => panic!("Expected a rejection, got {other:?}"),
    }

    tracker
        .upload_document(&office(), &upload(lead_id, DocumentCategory::Profile, true))
        .await
        .unwrap();
    let completed = tracker
        .complete_step(&office(), &transition(lead_id, kyc.id, None))
        .await
        .unwrap();
    assert_eq!(completed.status, StepStatus::Completed);
}

#[tokio::test]
async fn test_lead_status_changes_follow_adjacency() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let lead_id = new_lead(&tracker, "Farah Khan").await;

    // Profile submission is the only way into processing.
    tracker
        .upload_document(&office(), &upload(lead_id, DocumentCategory::Profile, true))
        .await
        .unwrap();
    let lead = tracker.get_lead(&Id { id: lead_id }).await.unwrap().unwrap();
    assert_eq!(lead.status, LeadStatus::Processing);

    let completed = tracker
        .change_lead_status(
            &admin(),
            &ChangeLeadStatus {
                lead_id,
                status: LeadStatus::Completed,
                remarks: Some("Installation verified".to_string()),
                expected_version: None,
            },
        )
        .await
        .expect("Processing -> completed should be accepted");
    assert_eq!(completed.status, LeadStatus::Completed);

    let err = tracker
        .change_lead_status(
            &admin(),
            &ChangeLeadStatus {
                lead_id,
                status: LeadStatus::Interested,
                remarks: None,
                expected_version: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::InvalidTransition));

    let activity = tracker.lead_activity(&Id { id: lead_id }).await.unwrap();
    assert!(activity
        .iter()
        .any(|entry| entry.remarks.as_deref() == Some("Installation verified")));
}

#[test]
fn test_every_unlisted_lead_transition_is_rejected() {
    let vocabulary = StatusVocabulary::standard();
    for from in LeadStatus::ALL {
        for to in LeadStatus::ALL {
            let allowed = vocabulary.lead_targets(from).contains(&to);
            assert_eq!(vocabulary.allows_lead_transition(from, to), allowed);
        }
        if from.is_closed() {
            assert!(vocabulary.lead_targets(from).is_empty());
        }
    }
    assert!(!vocabulary.allows_lead_transition(LeadStatus::Lead, LeadStatus::Processing));
}

#[tokio::test]
async fn test_role_outside_allowed_roles_is_refused_without_writes() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let install = define(&tracker, step("Installation", &[Role::Installer])).await;
    let lead_id = new_lead(&tracker, "Joseph Thomas").await;
    let before = tracker.lead_activity(&Id { id: lead_id }).await.unwrap().len();

    let err = tracker
        .complete_step(&sales(), &transition(lead_id, install.id, Some("done")))
        .await
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::Permission));

    let history = tracker.step_history(&Id { id: lead_id }).await.unwrap();
    assert_eq!(history[0].status, StepStatus::Pending);
    assert_eq!(history[0].version, 0);
    assert_eq!(
        tracker.lead_activity(&Id { id: lead_id }).await.unwrap().len(),
        before
    );
}

#[tokio::test]
async fn test_installer_assignment_unblocks_completion() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let install = define(
        &tracker,
        CreateDefinition {
            requires_installer_assignment: true,
            ..step("Installation", &[Role::Installer])
        },
    )
    .await;
    let lead_id = new_lead(&tracker, "Gopal Das").await;

    let err = tracker
        .complete_step(&installer(), &transition(lead_id, install.id, None))
        .await
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::MissingInstaller));

    tracker
        .assign_installer(
            &office(),
            &AssignInstaller {
                lead_id,
                installer: Some("inst-1".to_string()),
            },
        )
        .await
        .unwrap();
    let done = tracker
        .complete_step(&installer(), &transition(lead_id, install.id, None))
        .await
        .unwrap();
    assert_eq!(done.status, StepStatus::Completed);
}

#[tokio::test]
async fn test_reopen_is_admin_only_and_clears_metadata() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let survey = define(&tracker, step("Site Survey", &[Role::Sales])).await;
    let lead_id = new_lead(&tracker, "Neha Joshi").await;

    let halted = tracker
        .halt_step(&sales(), &transition(lead_id, survey.id, Some("Roof damaged")))
        .await
        .unwrap();
    assert_eq!(halted.status, StepStatus::Halted);

    let err = tracker
        .reopen_step(&sales(), &transition(lead_id, survey.id, None))
        .await
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::Permission));

    let reopened = tracker
        .reopen_step(&admin(), &transition(lead_id, survey.id, None))
        .await
        .unwrap();
    assert_eq!(reopened.status, StepStatus::Pending);
    assert!(reopened.completed_by.is_none());
    assert!(reopened.completed_at.is_none());
    assert!(reopened.remarks.is_none());
    assert!(reopened.attachments.is_empty());
    assert_eq!(reopened.version, halted.version + 1);

    // A pending step cannot be reopened again.
    let err = tracker
        .reopen_step(&admin(), &transition(lead_id, survey.id, None))
        .await
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::InvalidTransition));
}

#[tokio::test]
async fn test_closed_project_is_locked_for_staff() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let survey = define(&tracker, step("Site Survey", &[Role::Sales, Role::Admin])).await;
    let lead_id = new_lead(&tracker, "Vikram Singh").await;
    tracker
        .change_lead_status(
            &office(),
            &ChangeLeadStatus {
                lead_id,
                status: LeadStatus::Cancelled,
                remarks: Some("Customer withdrew".to_string()),
                expected_version: None,
            },
        )
        .await
        .unwrap();

    let err = tracker
        .skip_step(&sales(), &transition(lead_id, survey.id, None))
        .await
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::ProjectClosed));

    let timeline = tracker.timeline(&sales(), &Id { id: lead_id }).await.unwrap();
    assert!(timeline.entries.iter().all(|entry| !entry.can_act));

    let skipped = tracker
        .skip_step(&admin(), &transition(lead_id, survey.id, None))
        .await
        .expect("Admins may still act on closed projects");
    assert_eq!(skipped.status, StepStatus::Skipped);
}

#[tokio::test]
async fn test_timeline_tracks_next_step_and_progress() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let survey = define(&tracker, step("Site Survey", &[Role::Sales])).await;
    let design = define(&tracker, step("System Design", &[Role::Office])).await;
    define(&tracker, step("Installation", &[Role::Installer])).await;
    let lead_id = new_lead(&tracker, "Rohit Verma").await;

    let timeline = tracker.timeline(&admin(), &Id { id: lead_id }).await.unwrap();
    assert_eq!(timeline.entries.len(), 3);
    assert_eq!(timeline.progress.completed, 0);
    assert_eq!(
        timeline.next_actionable().map(|entry| entry.definition.id),
        Some(survey.id)
    );

    tracker
        .complete_step(&sales(), &transition(lead_id, survey.id, None))
        .await
        .unwrap();
    let timeline = tracker.timeline(&admin(), &Id { id: lead_id }).await.unwrap();
    assert_eq!(timeline.progress.completed, 1);
    assert_eq!(timeline.progress.percent(), 33);
    assert_eq!(
        timeline.next_actionable().map(|entry| entry.definition.id),
        Some(design.id)
    );

    // A skipped step is not completed, so nothing after it is actionable.
    tracker
        .skip_step(&office(), &transition(lead_id, design.id, Some("Standard kit")))
        .await
        .unwrap();
    let timeline = tracker.timeline(&admin(), &Id { id: lead_id }).await.unwrap();
    assert!(timeline.next_actionable().is_none());
}

#[tokio::test]
async fn test_completion_dialog_reports_requirements() {
    let (_temp_dir, tracker) = create_test_tracker().await;
    let definition = define(
        &tracker,
        CreateDefinition {
            remarks_required: true,
            attachments_allowed: true,
            required_documents: vec![RequiredDocument::file(DocumentCategory::ElectricityBill)],
            ..step("Net Metering", &[Role::Office])
        },
    )
    .await;
    let lead_id = new_lead(&tracker, "Sunita Reddy").await;
    let step_ref = StepRef {
        lead_id,
        definition_id: definition.id,
    };

    let dialog = tracker.open_completion_dialog(&office(), &step_ref).await.unwrap();
    assert!(dialog.can_act);
    assert!(dialog.remarks_required);
    assert!(dialog.attachments_allowed);
    assert!(!dialog.all_documents_satisfied());

    let customer = Actor::new("cust-1", Role::Customer);
    let dialog = tracker.open_completion_dialog(&customer, &step_ref).await.unwrap();
    assert!(!dialog.can_act);
}
