//! Helios CLI Application
//!
//! Command-line interface and MCP server for the Helios lead timeline.

mod args;
mod cli;
mod mcp;
mod renderer;

use std::process::ExitCode;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use helios_core::{
    display::{OperationStatus, Outcome},
    models::Actor,
    params::ListLeads,
    TrackerBuilder, WorkflowError,
};
use log::info;
use mcp::{run_stdio_server, HeliosMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let renderer = TerminalRenderer::new(!args.no_color);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<WorkflowError>() {
            Some(error) => {
                let status = OperationStatus::from_error(error);
                renderer.render_error(&status.to_string());
                match status.outcome {
                    Outcome::Rejected(_) => ExitCode::from(2),
                    Outcome::Success | Outcome::Failure => ExitCode::FAILURE,
                }
            }
            None => {
                renderer.render_error(&format!("Error: {e:#}\n"));
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let Args {
        database_file,
        no_color,
        user,
        role,
        command,
    } = args;

    let tracker = TrackerBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize tracker")?;

    let renderer = TerminalRenderer::new(!no_color);
    let actor = Actor::new(user, role.into());

    info!("Helios started as {} ({})", actor.user, actor.role);

    let cli = Cli::new(tracker.clone(), renderer, actor);
    match command {
        Some(Lead { command }) => cli.handle_lead_command(command).await,
        Some(Definition { command }) => cli.handle_definition_command(command).await,
        Some(Step { command }) => cli.handle_step_command(command).await,
        Some(Document { command }) => cli.handle_document_command(command).await,
        Some(Serve) => {
            info!("Starting Helios MCP server");
            run_stdio_server(HeliosMcpServer::new(tracker))
                .await
                .context("MCP server failed")
        }
        None => cli.list_leads(&ListLeads::default()).await,
    }
}
