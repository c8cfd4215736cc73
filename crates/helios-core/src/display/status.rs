//! Status and confirmation message types for operation feedback.

use std::fmt;

use crate::error::{RejectionKind, WorkflowError};

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// A workflow rule refused the operation
    Rejected(RejectionKind),
    Failure,
}

/// Wrapper type for displaying operation confirmation messages.
pub struct OperationStatus {
    pub message: String,
    pub outcome: Outcome,
}

impl OperationStatus {
    /// Create a new success status.
    pub fn success(message: String) -> Self {
        Self {
            message,
            outcome: Outcome::Success,
        }
    }

    /// Create a new failure status.
    pub fn failure(message: String) -> Self {
        Self {
            message,
            outcome: Outcome::Failure,
        }
    }

    /// Status for a failed operation, tagged when a workflow rule refused it.
    pub fn from_error(error: &WorkflowError) -> Self {
        let outcome = match error.rejection_kind() {
            Some(kind) => Outcome::Rejected(kind),
            None => Outcome::Failure,
        };
        Self {
            message: error.to_string(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Success => writeln!(f, "Success: {}", self.message),
            Outcome::Rejected(kind) => {
                writeln!(f, "Rejected ({}): {}", kind.as_str(), self.message)
            }
            Outcome::Failure => writeln!(f, "Error: {}", self.message),
        }
    }
}
