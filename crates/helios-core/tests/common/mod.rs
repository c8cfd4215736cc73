#![allow(dead_code)]

use helios_core::{
    models::{Actor, Role},
    params::{CreateDefinition, CreateLead},
    StepDefinition, Tracker, TrackerBuilder,
};
use tempfile::TempDir;

/// Helper function to create a test tracker
pub async fn create_test_tracker() -> (TempDir, Tracker) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let tracker = TrackerBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create tracker");
    (temp_dir, tracker)
}

pub fn admin() -> Actor {
    Actor::new("admin", Role::Admin)
}

pub fn office() -> Actor {
    Actor::new("office-1", Role::Office)
}

pub fn sales() -> Actor {
    Actor::new("sales-1", Role::Sales)
}

pub fn installer() -> Actor {
    Actor::new("inst-1", Role::Installer)
}

/// Creates a definition as admin, panicking on failure.
pub async fn define(tracker: &Tracker, params: CreateDefinition) -> StepDefinition {
    tracker
        .create_definition(&admin(), &params)
        .await
        .expect("Failed to create step definition")
}

pub fn step(name: &str, roles: &[Role]) -> CreateDefinition {
    CreateDefinition {
        name: name.to_string(),
        allowed_roles: roles.to_vec(),
        ..Default::default()
    }
}

/// Creates a lead as office staff and returns its id.
pub async fn new_lead(tracker: &Tracker, customer_name: &str) -> u64 {
    tracker
        .create_lead(
            &office(),
            &CreateLead {
                customer_name: customer_name.to_string(),
                phone: None,
                address: None,
            },
        )
        .await
        .expect("Failed to create lead")
        .id
}
