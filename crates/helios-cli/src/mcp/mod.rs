//! MCP server implementation for Helios
//!
//! Exposes the lead timeline to AI assistants over the Model Context
//! Protocol. Every tool that changes or reads a lead on behalf of someone
//! takes an `actor` object (`{"user": "...", "role": "office"}`) next to its
//! own parameters; the same role rules apply as on the command line.

use anyhow::Result;
use helios_core::{
    models::StepAction,
    params::{Acting, ChangeLeadStatus, Id, ListLeads, StepRef, StepTransition},
    Tracker,
};
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{McpHandlers, McpResult};

const INSTRUCTIONS: &str = r#"Helios tracks solar installation projects ("leads") through one shared template of steps.

## Core Concepts
- **Lead**: a customer project with a status (lead, lead_interested, lead_processing, lead_completed, lead_cancelled)
- **Step**: one entry of the template; per lead it is pending, completed, halted or skipped
- **Actor**: every acting tool takes `actor: {"user": "...", "role": "admin|office|sales|installer|customer"}`

## Workflow
1. `list_leads` to find the project
2. `show_timeline` to see the steps, progress and the next actionable step
3. `open_completion_dialog` before completing a step to see required remarks and documents
4. `complete_step`, `halt_step` or `skip_step` on a pending step; `reopen_step` (admin) to undo
5. `change_lead_status` to move the lead itself

## Rules
- Only roles listed on a step (and admin) may act on it
- Completed and cancelled leads are locked for everyone but admin
- Refusals come back as invalid params with a `rejection` tag such as `missing_remarks` or `missing_document`"#;

/// MCP server for Helios
#[derive(Clone)]
pub struct HeliosMcpServer {
    tracker: Tracker,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl HeliosMcpServer {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> McpHandlers {
        McpHandlers::new(self.tracker.clone())
    }

    #[tool(
        name = "list_leads",
        description = "List leads, optionally filtered by status (lead, lead_interested, lead_processing, lead_completed, lead_cancelled). Returns each lead's ID, customer name, status and installer."
    )]
    async fn list_leads(&self, Parameters(params): Parameters<ListLeads>) -> McpResult {
        self.handlers().list_leads(params).await
    }

    #[tool(
        name = "show_timeline",
        description = "Show the ordered step timeline of a lead (id = lead ID): each step's status, who finished it and when, remarks, whether the actor may act on it, progress, and the next actionable step."
    )]
    async fn show_timeline(&self, Parameters(params): Parameters<Acting<Id>>) -> McpResult {
        self.handlers().show_timeline(params).await
    }

    #[tool(
        name = "open_completion_dialog",
        description = "Show what completing one step of a lead requires: remarks, attachments, installer assignment, and each required document with whether it is satisfied and which actions (fill_form, upload_file, view, delete) are available."
    )]
    async fn open_completion_dialog(
        &self,
        Parameters(params): Parameters<Acting<StepRef>>,
    ) -> McpResult {
        self.handlers().open_completion_dialog(params).await
    }

    #[tool(
        name = "complete_step",
        description = "Complete a pending step. Refused unless the actor's role is allowed, the lead is open (or the actor is admin), remarks are given when required, an installer is assigned when required, and every required document is valid and submitted. Pass expected_version to guard against concurrent edits."
    )]
    async fn complete_step(
        &self,
        Parameters(params): Parameters<Acting<StepTransition>>,
    ) -> McpResult {
        self.handlers()
            .transition(params, StepAction::Complete)
            .await
    }

    #[tool(
        name = "halt_step",
        description = "Halt a pending step, recording who halted it and optional remarks explaining the blocker."
    )]
    async fn halt_step(&self, Parameters(params): Parameters<Acting<StepTransition>>) -> McpResult {
        self.handlers().transition(params, StepAction::Halt).await
    }

    #[tool(
        name = "skip_step",
        description = "Skip a pending step that does not apply to this lead, recording who skipped it."
    )]
    async fn skip_step(&self, Parameters(params): Parameters<Acting<StepTransition>>) -> McpResult {
        self.handlers().transition(params, StepAction::Skip).await
    }

    #[tool(
        name = "reopen_step",
        description = "Return a completed, halted or skipped step to pending and clear its completion metadata. Admin only."
    )]
    async fn reopen_step(
        &self,
        Parameters(params): Parameters<Acting<StepTransition>>,
    ) -> McpResult {
        self.handlers().transition(params, StepAction::Reopen).await
    }

    #[tool(
        name = "change_lead_status",
        description = "Change a lead's status by hand (admin and office). Only listed transitions are accepted: lead -> lead_interested or lead_cancelled, lead_interested -> lead_cancelled, lead_processing -> lead_completed or lead_cancelled. Remarks are recorded in the activity log."
    )]
    async fn change_lead_status(
        &self,
        Parameters(params): Parameters<Acting<ChangeLeadStatus>>,
    ) -> McpResult {
        self.handlers().change_lead_status(params).await
    }

    #[tool(
        name = "check_documents",
        description = "Check one step's required documents against a lead's uploads. Returns a category -> satisfied map; a document counts only when it is valid and submitted."
    )]
    async fn check_documents(&self, Parameters(params): Parameters<StepRef>) -> McpResult {
        self.handlers().check_documents(params).await
    }

    #[tool(
        name = "lead_activity",
        description = "Show the activity log of a lead (id = lead ID): status changes, step transitions and document events with actor, role and remarks."
    )]
    async fn lead_activity(&self, Parameters(params): Parameters<Id>) -> McpResult {
        self.handlers().lead_activity(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for HeliosMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "helios".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: HeliosMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Helios MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use helios_core::TrackerBuilder;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_server_registers_all_tools() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = TrackerBuilder::new()
            .with_database_path(Some(temp_dir.path().join("mcp.db")))
            .build()
            .await
            .unwrap();
        let server = HeliosMcpServer::new(tracker);

        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "change_lead_status",
                "check_documents",
                "complete_step",
                "halt_step",
                "lead_activity",
                "list_leads",
                "open_completion_dialog",
                "reopen_step",
                "show_timeline",
                "skip_step",
            ]
        );
        assert_eq!(server.get_info().server_info.name, "helios");
    }
}
