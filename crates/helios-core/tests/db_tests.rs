use helios_core::{
    models::{
        ActivityAction, Actor, DocumentCategory, DocumentStatus, LeadStatus, Role, StepAction,
        StepStatus,
    },
    params::{ChangeLeadStatus, CreateDefinition, CreateLead, StepTransition, UploadDocument},
    Database, RejectionKind, StatusVocabulary, WorkflowError,
};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn admin() -> Actor {
    Actor::new("admin", Role::Admin)
}

fn definition(name: &str) -> CreateDefinition {
    CreateDefinition {
        name: name.to_string(),
        allowed_roles: vec![Role::Office],
        ..Default::default()
    }
}

fn lead(db: &mut Database, name: &str) -> u64 {
    db.create_lead(
        &admin(),
        &CreateLead {
            customer_name: name.to_string(),
            ..Default::default()
        },
    )
    .expect("Failed to create lead")
    .id
}

#[test]
fn test_database_initialization() {
    let (temp_file, db) = create_test_db();
    assert!(temp_file.path().exists());
    assert!(db.list_definitions().unwrap().is_empty());
    assert!(db.list_leads(None).unwrap().is_empty());
}

#[test]
fn test_reopening_database_keeps_data() {
    let temp_file = NamedTempFile::new().unwrap();
    {
        let mut db = Database::new(temp_file.path()).unwrap();
        db.seed_default_definitions(&admin()).unwrap();
        lead(&mut db, "Kiran Patil");
    }
    let db = Database::new(temp_file.path()).expect("Schema init must be idempotent");
    assert_eq!(db.list_definitions().unwrap().len(), 8);
    assert_eq!(db.list_leads(None).unwrap().len(), 1);
}

#[test]
fn test_delete_definition_orphans_history() {
    let (_temp_file, mut db) = create_test_db();
    let survey = db.create_definition(&admin(), &definition("Survey")).unwrap();
    let install = db.create_definition(&admin(), &definition("Install")).unwrap();
    let lead_id = lead(&mut db, "Deepa Pillai");

    db.transition_step(
        &admin(),
        &StepTransition {
            lead_id,
            definition_id: survey.id,
            remarks: Some("Done".to_string()),
            ..Default::default()
        },
        StepAction::Complete,
    )
    .unwrap();

    let removed = db.delete_definition(&admin(), survey.id).unwrap();
    assert_eq!(removed.name, "Survey");
    assert_eq!(db.get_definition(install.id).unwrap().order_index, 1);

    let history = db.list_step_instances(lead_id).unwrap();
    assert_eq!(history.len(), 2);
    let orphan = history
        .iter()
        .find(|step| step.step_name == "Survey")
        .expect("History survives deletion");
    assert_eq!(orphan.definition_id, None);
    assert_eq!(orphan.status, StepStatus::Completed);

    let timeline = db.timeline(&admin(), lead_id).unwrap();
    assert_eq!(timeline.entries.len(), 1);
    assert_eq!(timeline.entries[0].definition.name, "Install");
}

#[test]
fn test_reorder_rejects_partial_lists() {
    let (_temp_file, mut db) = create_test_db();
    let a = db.create_definition(&admin(), &definition("A")).unwrap();
    let b = db.create_definition(&admin(), &definition("B")).unwrap();

    let err = db.reorder_definitions(&admin(), &[b.id]).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput { .. }));

    let reordered = db.reorder_definitions(&admin(), &[b.id, a.id]).unwrap();
    let names: Vec<_> = reordered.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
}

#[test]
fn test_stale_step_version_is_refused() {
    let (_temp_file, mut db) = create_test_db();
    let survey = db.create_definition(&admin(), &definition("Survey")).unwrap();
    let lead_id = lead(&mut db, "Manoj Gupta");
    let params = StepTransition {
        lead_id,
        definition_id: survey.id,
        expected_version: Some(0),
        ..Default::default()
    };

    db.transition_step(&admin(), &params, StepAction::Halt).unwrap();
    let err = db
        .transition_step(&admin(), &params, StepAction::Reopen)
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::VersionConflict {
            expected: 0,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn test_activity_log_records_lifecycle() {
    let (_temp_file, mut db) = create_test_db();
    let survey = db.create_definition(&admin(), &definition("Survey")).unwrap();
    let lead_id = lead(&mut db, "Sneha Kulkarni");

    db.upload_document(
        &admin(),
        &UploadDocument {
            lead_id,
            category: DocumentCategory::Profile,
            file_name: "profile.json".to_string(),
            content_type: None,
            size_bytes: 120,
            submit: true,
        },
    )
    .unwrap();
    db.transition_step(
        &admin(),
        &StepTransition {
            lead_id,
            definition_id: survey.id,
            ..Default::default()
        },
        StepAction::Skip,
    )
    .unwrap();

    let actions: Vec<ActivityAction> = db
        .lead_activity(lead_id)
        .unwrap()
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert!(actions.contains(&ActivityAction::LeadCreated));
    assert!(actions.contains(&ActivityAction::LeadStatusChanged));
    assert!(actions.contains(&ActivityAction::StepSkipped));
}

#[test]
fn test_replacing_a_document_keeps_one_valid_copy() {
    let (_temp_file, mut db) = create_test_db();
    let lead_id = lead(&mut db, "Arjun Nair");
    let upload = UploadDocument {
        lead_id,
        category: DocumentCategory::ElectricityBill,
        file_name: "bill.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        size_bytes: 4096,
        submit: true,
    };

    db.upload_document(&admin(), &upload).unwrap();
    db.upload_document(&admin(), &upload).unwrap();

    let documents = db.list_documents(lead_id).unwrap();
    let valid = documents
        .iter()
        .filter(|doc| doc.status == DocumentStatus::Valid)
        .count();
    assert_eq!(documents.len(), 2);
    assert_eq!(valid, 1);
}

#[test]
fn test_manual_status_change_needs_lead_manager() {
    let (_temp_file, mut db) = create_test_db();
    let lead_id = lead(&mut db, "Pooja Sharma");
    let err = db
        .change_lead_status(
            &Actor::new("sales-1", Role::Sales),
            &StatusVocabulary::standard(),
            &ChangeLeadStatus {
                lead_id,
                status: LeadStatus::Interested,
                remarks: None,
                expected_version: None,
            },
        )
        .unwrap_err();
    assert_eq!(err.rejection_kind(), Some(RejectionKind::Permission));
}
