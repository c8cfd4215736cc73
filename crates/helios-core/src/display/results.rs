//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::models::{Document, Lead, StepAction, StepDefinition, StepInstance};

/// Wrapper type for displaying the result of create operations.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Lead> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created lead with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<StepDefinition> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created step definition with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Document> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recorded document with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, optionally
/// listing what changed.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl<T: fmt::Display> UpdateResult<T> {
    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<Lead> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated lead {}", self.resource.id)?;
        writeln!(f)?;
        self.fmt_changes(f)
    }
}

impl fmt::Display for UpdateResult<StepDefinition> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated step definition {}", self.resource.id)?;
        writeln!(f)?;
        self.fmt_changes(f)
    }
}

impl fmt::Display for UpdateResult<Document> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated document {}", self.resource.id)?;
        writeln!(f)?;
        self.fmt_changes(f)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<StepDefinition> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted step definition '{}' (ID: {}). Existing step history is kept.",
            self.resource.name, self.resource.id
        )
    }
}

impl fmt::Display for DeleteResult<Document> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted document {} ({})",
            self.resource.id, self.resource.file_name
        )
    }
}

/// Wrapper type for displaying a step after a transition.
pub struct TransitionResult {
    pub action: StepAction,
    pub step: StepInstance,
}

impl fmt::Display for TransitionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            StepAction::Complete => "Completed",
            StepAction::Halt => "Halted",
            StepAction::Skip => "Skipped",
            StepAction::Reopen => "Reopened",
        };
        writeln!(f, "{verb} step '{}' of lead {}", self.step.step_name, self.step.lead_id)?;
        writeln!(f)?;
        write!(f, "{}", self.step)
    }
}
