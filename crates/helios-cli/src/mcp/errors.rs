//! Error mapping for the MCP server

use helios_core::WorkflowError;
use rmcp::ErrorData;
use serde_json::json;

/// Converts a tracker error into an MCP error.
///
/// Rule refusals and unknown IDs are the caller's problem and come back as
/// invalid params, tagged with the rejection kind when there is one.
pub fn to_mcp_error(message: &str, error: &WorkflowError) -> ErrorData {
    let text = format!("{message}: {error}");
    if let Some(kind) = error.rejection_kind() {
        return ErrorData::invalid_params(text, Some(json!({ "rejection": kind.as_str() })));
    }
    match error {
        WorkflowError::LeadNotFound { .. }
        | WorkflowError::StepNotFound { .. }
        | WorkflowError::DefinitionNotFound { .. }
        | WorkflowError::DocumentNotFound { .. }
        | WorkflowError::InvalidInput { .. }
        | WorkflowError::VersionConflict { .. } => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}

#[cfg(test)]
mod tests {
    use helios_core::{models::Role, Rejection};
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_rejection_maps_to_invalid_params() {
        let error = WorkflowError::from(Rejection::Permission {
            role: Role::Customer,
            action: "complete 'Installation'".to_string(),
        });
        let mapped = to_mcp_error("Failed to complete step", &error);
        assert_eq!(mapped.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(mapped.data, Some(json!({ "rejection": "permission" })));
    }

    #[test]
    fn test_storage_failure_maps_to_internal_error() {
        let error = WorkflowError::Configuration {
            message: "Task join error".to_string(),
        };
        let mapped = to_mcp_error("Failed to list leads", &error);
        assert_eq!(mapped.code, ErrorCode::INTERNAL_ERROR);
    }
}
