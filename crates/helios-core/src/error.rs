//! Error types for the workflow library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{DocumentCategory, LeadStatus, Role, StepAction, StepStatus};

/// Comprehensive error type for all workflow operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Lead not found for the given ID
    #[error("Lead with ID {id} not found")]
    LeadNotFound { id: u64 },
    /// No step instance for the given lead and definition
    #[error("Step {definition_id} not found for lead {lead_id}")]
    StepNotFound { lead_id: u64, definition_id: u64 },
    /// Step definition not found for the given ID
    #[error("Step definition with ID {id} not found")]
    DefinitionNotFound { id: u64 },
    /// Document not found for the given ID
    #[error("Document with ID {id} not found")]
    DocumentNotFound { id: u64 },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// A workflow rule refused the requested transition
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// The row changed since the caller last read it
    #[error("{entity} {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        entity: &'static str,
        id: u64,
        expected: u64,
        actual: u64,
    },
}

/// Tag identifying which workflow rule refused a transition.
///
/// Front ends match on this rather than on message text so they can format
/// and localize refusals consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    Permission,
    ProjectClosed,
    InvalidTransition,
    MissingInstaller,
    MissingRemarks,
    MissingDocument,
}

impl RejectionKind {
    /// Stable snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::Permission => "permission",
            RejectionKind::ProjectClosed => "project_closed",
            RejectionKind::InvalidTransition => "invalid_transition",
            RejectionKind::MissingInstaller => "missing_installer",
            RejectionKind::MissingRemarks => "missing_remarks",
            RejectionKind::MissingDocument => "missing_document",
        }
    }
}

/// A refused step or lead transition, with the data needed to explain it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("role '{role}' is not permitted to {action}")]
    Permission { role: Role, action: String },
    #[error("project is {status}; only admin may act on it")]
    ProjectClosed { status: LeadStatus },
    #[error("cannot {action} a step that is {from}")]
    InvalidStepTransition { action: StepAction, from: StepStatus },
    #[error("lead status cannot change from {from} to {to}")]
    InvalidLeadTransition { from: LeadStatus, to: LeadStatus },
    #[error("an installer must be assigned before completing '{step}'")]
    MissingInstaller { step: String },
    #[error("remarks required to complete '{step}'")]
    MissingRemarks { step: String },
    #[error("missing required documents: {}", join_categories(.categories))]
    MissingDocument { categories: Vec<DocumentCategory> },
}

impl Rejection {
    /// The rule that produced this rejection.
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::Permission { .. } => RejectionKind::Permission,
            Rejection::ProjectClosed { .. } => RejectionKind::ProjectClosed,
            Rejection::InvalidStepTransition { .. } | Rejection::InvalidLeadTransition { .. } => {
                RejectionKind::InvalidTransition
            }
            Rejection::MissingInstaller { .. } => RejectionKind::MissingInstaller,
            Rejection::MissingRemarks { .. } => RejectionKind::MissingRemarks,
            Rejection::MissingDocument { .. } => RejectionKind::MissingDocument,
        }
    }
}

fn join_categories(categories: &[DocumentCategory]) -> String {
    categories
        .iter()
        .map(DocumentCategory::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> WorkflowError {
        WorkflowError::Database {
            message: self.message,
            source,
        }
    }
}

impl WorkflowError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Shorthand for an [`WorkflowError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The rejection tag, when this error is a refused transition.
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            WorkflowError::Rejected(rejection) => Some(rejection.kind()),
            _ => None,
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| WorkflowError::database(message).with_source(e))
    }
}

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
