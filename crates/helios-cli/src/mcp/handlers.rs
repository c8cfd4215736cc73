//! MCP tool handlers implementation
//!
//! Each handler runs one tracker operation and renders the result as
//! markdown. Tools that act on a lead take the acting user alongside their
//! parameters through [`Acting`].

use helios_core::{
    display::{ActivityLog, Leads, OperationStatus, TransitionResult, UpdateResult},
    models::StepAction,
    params::{Acting, ChangeLeadStatus, Id, ListLeads, StepRef, StepTransition},
    Tracker,
};
use log::debug;
use rmcp::{
    model::{CallToolResult, Content},
    ErrorData,
};

use super::errors::to_mcp_error;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl Into<String>) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(output.into())]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    tracker: Tracker,
}

impl McpHandlers {
    pub fn new(tracker: Tracker) -> Self {
        Self { tracker }
    }

    pub async fn list_leads(&self, params: ListLeads) -> McpResult {
        debug!("list_leads: {params:?}");

        let leads = self
            .tracker
            .list_leads(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to list leads", &e))?;

        let title = match params.status {
            Some(status) => format!("Leads ({status})"),
            None => "Leads".to_string(),
        };
        text(format!("# {title}\n\n{}", Leads(leads)))
    }

    pub async fn show_timeline(&self, params: Acting<Id>) -> McpResult {
        debug!("show_timeline: {params:?}");

        let timeline = self
            .tracker
            .timeline(&params.actor, &params.params)
            .await
            .map_err(|e| to_mcp_error("Failed to load timeline", &e))?;
        text(timeline.to_string())
    }

    pub async fn open_completion_dialog(&self, params: Acting<StepRef>) -> McpResult {
        debug!("open_completion_dialog: {params:?}");

        let dialog = self
            .tracker
            .open_completion_dialog(&params.actor, &params.params)
            .await
            .map_err(|e| to_mcp_error("Failed to open completion dialog", &e))?;
        text(dialog.to_string())
    }

    pub async fn transition(
        &self,
        params: Acting<StepTransition>,
        action: StepAction,
    ) -> McpResult {
        debug!("{action}_step: {params:?}");

        let step = self
            .tracker
            .transition(&params.actor, &params.params, action)
            .await
            .map_err(|e| to_mcp_error(&format!("Failed to {action} step"), &e))?;
        text(TransitionResult { action, step }.to_string())
    }

    pub async fn change_lead_status(&self, params: Acting<ChangeLeadStatus>) -> McpResult {
        debug!("change_lead_status: {params:?}");

        let lead = self
            .tracker
            .change_lead_status(&params.actor, &params.params)
            .await
            .map_err(|e| to_mcp_error("Failed to change lead status", &e))?;
        let change = format!("status: {}", lead.status);
        text(UpdateResult::with_changes(lead, vec![change]).to_string())
    }

    pub async fn check_documents(&self, params: StepRef) -> McpResult {
        debug!("check_documents: {params:?}");

        let report = self
            .tracker
            .check_documents(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to check documents", &e))?;
        let map = serde_json::to_string_pretty(&report.as_map())
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
        text(format!("# Required Documents\n\n{report}\n```json\n{map}\n```\n"))
    }

    pub async fn lead_activity(&self, params: Id) -> McpResult {
        debug!("lead_activity: {params:?}");

        let entries = self
            .tracker
            .lead_activity(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to load activity", &e))?;
        if entries.is_empty() {
            let status = OperationStatus::success(format!(
                "Lead {} has no recorded activity",
                params.id
            ));
            return text(status.to_string());
        }
        text(format!("# Activity\n\n{}", ActivityLog(entries)))
    }
}
