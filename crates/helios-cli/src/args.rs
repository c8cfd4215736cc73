use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{DefinitionCommands, DocumentCommands, LeadCommands, RoleArg, StepCommands};

/// Command-line interface for the Helios lead timeline
///
/// Every customer project (a "lead") moves through one admin-configured
/// template of steps. Helios records who completed, halted or skipped each
/// step, gates completion on remarks, documents and installer assignment, and
/// exposes the same operations to AI assistants through an MCP server.
#[derive(Parser)]
#[command(version, about, name = "helios")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/helios/helios.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// User reference recorded in step metadata and the activity log
    #[arg(long, global = true, default_value = "admin")]
    pub user: String,

    /// Role to act under
    #[arg(long, global = true, value_enum, default_value_t = RoleArg::Admin)]
    pub role: RoleArg,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Helios CLI
///
/// - `lead`: create leads, change their status, assign installers
/// - `definition`: manage the universal step template (admin only)
/// - `step`: view a lead's timeline and act on its steps
/// - `document`: record, submit and check customer documents
/// - `serve`: start the MCP server for AI assistant integration
#[derive(Subcommand)]
pub enum Commands {
    /// Manage leads
    #[command(alias = "l")]
    Lead {
        #[command(subcommand)]
        command: LeadCommands,
    },
    /// Manage the step template
    #[command(alias = "def")]
    Definition {
        #[command(subcommand)]
        command: DefinitionCommands,
    },
    /// View and act on a lead's steps
    #[command(alias = "s")]
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Manage a lead's documents
    #[command(alias = "doc")]
    Document {
        #[command(subcommand)]
        command: DocumentCommands,
    },
    /// Start the MCP server
    Serve,
}
