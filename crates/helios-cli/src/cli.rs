//! Command-line argument wrappers and command handlers.
//!
//! Core parameter types carry no clap derives. Each command here defines its
//! own clap struct and converts into the core type with `From`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Tracker
//! ```
//!
//! [`Cli`] then runs the operation as the actor given by the global
//! `--user`/`--role` flags and renders the markdown result.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use helios_core::{
    display::{
        ActivityLog, CreateResult, DeleteResult, Definitions, Documents, Leads, OperationStatus,
        TransitionResult, UpdateResult,
    },
    models::{Actor, DocumentCategory, LeadStatus, RequiredDocument, Role, StepAction},
    params::*,
    Tracker, WorkflowError,
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Global argument enums
// ============================================================================

/// Role the CLI user acts under.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum RoleArg {
    Admin,
    Office,
    Sales,
    Installer,
    Customer,
}

impl From<RoleArg> for Role {
    fn from(val: RoleArg) -> Self {
        match val {
            RoleArg::Admin => Role::Admin,
            RoleArg::Office => Role::Office,
            RoleArg::Sales => Role::Sales,
            RoleArg::Installer => Role::Installer,
            RoleArg::Customer => Role::Customer,
        }
    }
}

/// Lead status values accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LeadStatusArg {
    Lead,
    Interested,
    Processing,
    Completed,
    Cancelled,
}

impl From<LeadStatusArg> for LeadStatus {
    fn from(val: LeadStatusArg) -> Self {
        match val {
            LeadStatusArg::Lead => LeadStatus::Lead,
            LeadStatusArg::Interested => LeadStatus::Interested,
            LeadStatusArg::Processing => LeadStatus::Processing,
            LeadStatusArg::Completed => LeadStatus::Completed,
            LeadStatusArg::Cancelled => LeadStatus::Cancelled,
        }
    }
}

// ============================================================================
// Lead commands
// ============================================================================

/// Create a new lead
///
/// Every step of the current template is instantiated as pending for the new
/// lead. Only admin, office and sales users may create leads.
#[derive(Args)]
pub struct CreateLeadArgs {
    /// Customer name
    pub customer_name: String,
    #[arg(short, long, help = "Customer phone number")]
    pub phone: Option<String>,
    #[arg(short, long, help = "Installation site address")]
    pub address: Option<String>,
}

impl From<CreateLeadArgs> for CreateLead {
    fn from(val: CreateLeadArgs) -> Self {
        CreateLead {
            customer_name: val.customer_name,
            phone: val.phone,
            address: val.address,
        }
    }
}

/// List leads, optionally filtered by status
#[derive(Args)]
pub struct ListLeadsArgs {
    #[arg(short, long, value_enum, help = "Only show leads with this status")]
    pub status: Option<LeadStatusArg>,
}

impl From<ListLeadsArgs> for ListLeads {
    fn from(val: ListLeadsArgs) -> Self {
        ListLeads {
            status: val.status.map(Into::into),
        }
    }
}

/// Identify a lead by ID
#[derive(Args)]
pub struct LeadIdArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub id: u64,
}

impl From<LeadIdArgs> for Id {
    fn from(val: LeadIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Change a lead's status by hand
///
/// Only transitions listed in the lead status table are accepted. Moving into
/// processing happens automatically when the customer profile is submitted.
#[derive(Args)]
pub struct ChangeStatusArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub lead_id: u64,
    #[arg(value_enum, help = "Target status")]
    pub status: LeadStatusArg,
    #[arg(short, long, help = "Remarks recorded in the activity log")]
    pub remarks: Option<String>,
    #[arg(long, help = "Refuse the change if the lead is no longer at this version")]
    pub expected_version: Option<u64>,
}

impl From<ChangeStatusArgs> for ChangeLeadStatus {
    fn from(val: ChangeStatusArgs) -> Self {
        ChangeLeadStatus {
            lead_id: val.lead_id,
            status: val.status.into(),
            remarks: val.remarks,
            expected_version: val.expected_version,
        }
    }
}

/// Assign or clear a lead's installer
#[derive(Args)]
pub struct AssignArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub lead_id: u64,
    #[arg(help = "Installer user reference; omit to clear the assignment")]
    pub installer: Option<String>,
}

impl From<AssignArgs> for AssignInstaller {
    fn from(val: AssignArgs) -> Self {
        AssignInstaller {
            lead_id: val.lead_id,
            installer: val.installer,
        }
    }
}

#[derive(Subcommand)]
pub enum LeadCommands {
    /// Create a new lead
    #[command(alias = "c")]
    Create(CreateLeadArgs),
    /// List leads
    #[command(aliases = ["l", "ls"])]
    List(ListLeadsArgs),
    /// Show a lead
    #[command(alias = "s")]
    Show(LeadIdArgs),
    /// Change a lead's status
    Status(ChangeStatusArgs),
    /// Assign or clear the installer
    Assign(AssignArgs),
    /// Show the activity log of a lead
    #[command(alias = "log")]
    Activity(LeadIdArgs),
}

// ============================================================================
// Step definition commands
// ============================================================================

/// Add a step to the universal template
///
/// Required documents use the form `category[:form|file[:submission|verification]]`,
/// for example `aadhaar_front:file` or `profile:form`.
#[derive(Args)]
pub struct CreateDefinitionArgs {
    /// Step name
    pub name: String,
    #[arg(short, long, help = "What the step involves")]
    pub description: Option<String>,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Roles besides admin that may act on the step, comma-separated"
    )]
    pub roles: Vec<Role>,
    #[arg(long, help = "Completing the step requires remarks")]
    pub remarks_required: bool,
    #[arg(long, help = "The step accepts attachments")]
    pub attachments_allowed: bool,
    #[arg(long, help = "Customers may upload the step's documents")]
    pub customer_upload: bool,
    #[arg(long, help = "An installer must be assigned before completion")]
    pub requires_installer: bool,
    #[arg(
        long = "document",
        help = "Required document, repeatable (e.g. aadhaar_front:file)"
    )]
    pub documents: Vec<RequiredDocument>,
    #[arg(short, long, help = "1-based position; appended at the end when omitted")]
    pub position: Option<u32>,
}

impl From<CreateDefinitionArgs> for CreateDefinition {
    fn from(val: CreateDefinitionArgs) -> Self {
        CreateDefinition {
            name: val.name,
            description: val.description,
            allowed_roles: val.roles,
            remarks_required: val.remarks_required,
            attachments_allowed: val.attachments_allowed,
            customer_upload: val.customer_upload,
            requires_installer_assignment: val.requires_installer,
            required_documents: val.documents,
            position: val.position,
        }
    }
}

/// Edit a step definition
///
/// Only the given fields change. Flags take an explicit `true` or `false`.
#[derive(Args)]
pub struct EditDefinitionArgs {
    #[arg(help = "Unique identifier of the step definition")]
    pub id: u64,
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long, help = "New description; pass an empty string to clear it")]
    pub description: Option<String>,
    #[arg(short, long, value_delimiter = ',')]
    pub roles: Option<Vec<Role>>,
    #[arg(long)]
    pub remarks_required: Option<bool>,
    #[arg(long)]
    pub attachments_allowed: Option<bool>,
    #[arg(long)]
    pub customer_upload: Option<bool>,
    #[arg(long)]
    pub requires_installer: Option<bool>,
    #[arg(long = "document", help = "Replaces the required documents, repeatable")]
    pub documents: Option<Vec<RequiredDocument>>,
}

impl From<EditDefinitionArgs> for EditDefinition {
    fn from(val: EditDefinitionArgs) -> Self {
        EditDefinition {
            id: val.id,
            name: val.name,
            description: val.description,
            allowed_roles: val.roles,
            remarks_required: val.remarks_required,
            attachments_allowed: val.attachments_allowed,
            customer_upload: val.customer_upload,
            requires_installer_assignment: val.requires_installer,
            required_documents: val.documents,
        }
    }
}

/// Delete a step definition
///
/// Existing step instances keep their history but drop out of timelines.
#[derive(Args)]
pub struct DeleteDefinitionArgs {
    #[arg(help = "Unique identifier of the step definition to delete")]
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

/// Reorder the whole template
#[derive(Args)]
pub struct ReorderArgs {
    #[arg(
        value_delimiter = ',',
        required = true,
        help = "Every definition ID in the new order, comma-separated"
    )]
    pub ids: Vec<u64>,
}

impl From<ReorderArgs> for ReorderDefinitions {
    fn from(val: ReorderArgs) -> Self {
        ReorderDefinitions { ids: val.ids }
    }
}

#[derive(Subcommand)]
pub enum DefinitionCommands {
    /// List the step template in order
    #[command(aliases = ["l", "ls"])]
    List,
    /// Add a step to the template
    #[command(alias = "c")]
    Create(CreateDefinitionArgs),
    /// Edit a step definition
    #[command(alias = "e")]
    Edit(EditDefinitionArgs),
    /// Delete a step definition
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteDefinitionArgs),
    /// Reorder the template
    Reorder(ReorderArgs),
    /// Install the default solar template into an empty database
    Seed,
}

// ============================================================================
// Step commands
// ============================================================================

/// Identify one step of one lead
#[derive(Args)]
pub struct StepRefArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub lead_id: u64,
    #[arg(help = "Unique identifier of the step definition")]
    pub definition_id: u64,
}

impl From<StepRefArgs> for StepRef {
    fn from(val: StepRefArgs) -> Self {
        StepRef {
            lead_id: val.lead_id,
            definition_id: val.definition_id,
        }
    }
}

/// Complete, halt, skip or reopen a step
#[derive(Args)]
pub struct TransitionArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub lead_id: u64,
    #[arg(help = "Unique identifier of the step definition")]
    pub definition_id: u64,
    #[arg(short, long, help = "Remarks recorded on the step")]
    pub remarks: Option<String>,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Attachment references, comma-separated"
    )]
    pub attachments: Vec<String>,
    #[arg(long, help = "Refuse the change if the step is no longer at this version")]
    pub expected_version: Option<u64>,
}

impl From<TransitionArgs> for StepTransition {
    fn from(val: TransitionArgs) -> Self {
        StepTransition {
            lead_id: val.lead_id,
            definition_id: val.definition_id,
            remarks: val.remarks,
            attachments: val.attachments,
            expected_version: val.expected_version,
        }
    }
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// Show a lead's timeline
    #[command(aliases = ["t", "show"])]
    Timeline(LeadIdArgs),
    /// Show what completing a step requires
    #[command(alias = "d")]
    Dialog(StepRefArgs),
    /// Complete a pending step
    #[command(alias = "c")]
    Complete(TransitionArgs),
    /// Halt a pending step
    Halt(TransitionArgs),
    /// Skip a pending step
    Skip(TransitionArgs),
    /// Reopen a finished step (admin only)
    Reopen(TransitionArgs),
    /// List every step instance of a lead, including orphaned ones
    History(LeadIdArgs),
}

// ============================================================================
// Document commands
// ============================================================================

/// Record an uploaded document
#[derive(Args)]
pub struct UploadArgs {
    #[arg(help = "Unique identifier of the lead")]
    pub lead_id: u64,
    #[arg(help = "Document category (e.g. aadhaar_front, profile)")]
    pub category: DocumentCategory,
    #[arg(help = "Original file name")]
    pub file_name: String,
    #[arg(long)]
    pub content_type: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub size: u64,
    #[arg(long, help = "Submit immediately instead of keeping a draft")]
    pub submit: bool,
}

impl From<UploadArgs> for UploadDocument {
    fn from(val: UploadArgs) -> Self {
        UploadDocument {
            lead_id: val.lead_id,
            category: val.category,
            file_name: val.file_name,
            content_type: val.content_type,
            size_bytes: val.size,
            submit: val.submit,
        }
    }
}

/// Identify a document by ID
#[derive(Args)]
pub struct DocumentIdArgs {
    #[arg(help = "Unique identifier of the document")]
    pub id: u64,
}

impl From<DocumentIdArgs> for Id {
    fn from(val: DocumentIdArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// Record an uploaded document
    #[command(alias = "u")]
    Upload(UploadArgs),
    /// Submit a draft document
    Submit(DocumentIdArgs),
    /// Mark a document as corrupted
    Corrupt(DocumentIdArgs),
    /// Delete a document
    #[command(aliases = ["d", "rm"])]
    Delete(DocumentIdArgs),
    /// List a lead's documents
    #[command(aliases = ["l", "ls"])]
    List(LeadIdArgs),
    /// Check a step's required documents for a lead
    Check(StepRefArgs),
}

// ============================================================================
// Command handlers
// ============================================================================

/// Runs parsed commands against a tracker and renders the output.
pub struct Cli {
    tracker: Tracker,
    renderer: TerminalRenderer,
    actor: Actor,
}

impl Cli {
    pub fn new(tracker: Tracker, renderer: TerminalRenderer, actor: Actor) -> Self {
        Self {
            tracker,
            renderer,
            actor,
        }
    }

    pub async fn handle_lead_command(&self, command: LeadCommands) -> Result<()> {
        match command {
            LeadCommands::Create(args) => {
                let lead = self.tracker.create_lead(&self.actor, &args.into()).await?;
                self.renderer.render(&CreateResult::new(lead).to_string())
            }
            LeadCommands::List(args) => self.list_leads(&args.into()).await,
            LeadCommands::Show(args) => {
                let params: Id = args.into();
                let lead = self
                    .tracker
                    .get_lead(&params)
                    .await?
                    .ok_or(WorkflowError::LeadNotFound { id: params.id })?;
                self.renderer.render(&lead.to_string())
            }
            LeadCommands::Status(args) => {
                let params: ChangeLeadStatus = args.into();
                let before = self.current_status(params.lead_id).await?;
                let lead = self.tracker.change_lead_status(&self.actor, &params).await?;
                let change = format!("status: {before} -> {}", lead.status);
                self.renderer
                    .render(&UpdateResult::with_changes(lead, vec![change]).to_string())
            }
            LeadCommands::Assign(args) => {
                let lead = self
                    .tracker
                    .assign_installer(&self.actor, &args.into())
                    .await?;
                self.renderer.render(&UpdateResult::new(lead).to_string())
            }
            LeadCommands::Activity(args) => {
                let entries = self.tracker.lead_activity(&args.into()).await?;
                let output = format!("# Activity\n\n{}", ActivityLog(entries));
                self.renderer.render(&output)
            }
        }
    }

    pub async fn list_leads(&self, params: &ListLeads) -> Result<()> {
        let leads = self.tracker.list_leads(params).await?;
        let title = match params.status {
            Some(status) => format!("Leads ({status})"),
            None => "Leads".to_string(),
        };
        let output = format!("# {title}\n\n{}", Leads(leads));
        self.renderer.render(&output)
    }

    async fn current_status(&self, lead_id: u64) -> Result<LeadStatus> {
        let lead = self
            .tracker
            .get_lead(&Id { id: lead_id })
            .await?
            .ok_or(WorkflowError::LeadNotFound { id: lead_id })?;
        Ok(lead.status)
    }

    pub async fn handle_definition_command(&self, command: DefinitionCommands) -> Result<()> {
        match command {
            DefinitionCommands::List => {
                let definitions = self.tracker.list_definitions().await?;
                let output = format!("# Step Template\n\n{}", Definitions(definitions));
                self.renderer.render(&output)
            }
            DefinitionCommands::Create(args) => {
                let definition = self
                    .tracker
                    .create_definition(&self.actor, &args.into())
                    .await?;
                self.renderer
                    .render(&CreateResult::new(definition).to_string())
            }
            DefinitionCommands::Edit(args) => {
                let definition = self
                    .tracker
                    .edit_definition(&self.actor, &args.into())
                    .await?;
                self.renderer
                    .render(&UpdateResult::new(definition).to_string())
            }
            DefinitionCommands::Delete(args) => {
                if !args.confirm {
                    let status = OperationStatus::failure(format!(
                        "Refusing to delete step definition {} without --confirm",
                        args.id
                    ));
                    return self.renderer.render(&status.to_string());
                }
                let definition = self
                    .tracker
                    .delete_definition(&self.actor, &Id { id: args.id })
                    .await?;
                self.renderer
                    .render(&DeleteResult::new(definition).to_string())
            }
            DefinitionCommands::Reorder(args) => {
                let definitions = self
                    .tracker
                    .reorder_definitions(&self.actor, &args.into())
                    .await?;
                let output = format!("# Step Template\n\n{}", Definitions(definitions));
                self.renderer.render(&output)
            }
            DefinitionCommands::Seed => {
                let seeded = self.tracker.seed_default_definitions(&self.actor).await?;
                let status = if seeded.is_empty() {
                    OperationStatus::success(
                        "Step template already exists; nothing seeded".to_string(),
                    )
                } else {
                    OperationStatus::success(format!("Seeded {} step definitions", seeded.len()))
                };
                self.renderer.render(&status.to_string())
            }
        }
    }

    pub async fn handle_step_command(&self, command: StepCommands) -> Result<()> {
        match command {
            StepCommands::Timeline(args) => {
                let timeline = self.tracker.timeline(&self.actor, &args.into()).await?;
                self.renderer.render(&timeline.to_string())
            }
            StepCommands::Dialog(args) => {
                let dialog = self
                    .tracker
                    .open_completion_dialog(&self.actor, &args.into())
                    .await?;
                self.renderer.render(&dialog.to_string())
            }
            StepCommands::Complete(args) => self.transition(args, StepAction::Complete).await,
            StepCommands::Halt(args) => self.transition(args, StepAction::Halt).await,
            StepCommands::Skip(args) => self.transition(args, StepAction::Skip).await,
            StepCommands::Reopen(args) => self.transition(args, StepAction::Reopen).await,
            StepCommands::History(args) => {
                let steps = self.tracker.step_history(&args.into()).await?;
                let mut output = String::from("# Step History\n\n");
                if steps.is_empty() {
                    output.push_str("No steps recorded.\n");
                }
                for step in steps {
                    output.push_str(&step.to_string());
                }
                self.renderer.render(&output)
            }
        }
    }

    async fn transition(&self, args: TransitionArgs, action: StepAction) -> Result<()> {
        let step = self
            .tracker
            .transition(&self.actor, &args.into(), action)
            .await?;
        self.renderer
            .render(&TransitionResult { action, step }.to_string())
    }

    pub async fn handle_document_command(&self, command: DocumentCommands) -> Result<()> {
        match command {
            DocumentCommands::Upload(args) => {
                let document = self
                    .tracker
                    .upload_document(&self.actor, &args.into())
                    .await?;
                self.renderer.render(&CreateResult::new(document).to_string())
            }
            DocumentCommands::Submit(args) => {
                let document = self
                    .tracker
                    .submit_document(&self.actor, &args.into())
                    .await?;
                self.renderer.render(&UpdateResult::new(document).to_string())
            }
            DocumentCommands::Corrupt(args) => {
                let document = self
                    .tracker
                    .mark_document_corrupted(&self.actor, &args.into())
                    .await?;
                self.renderer.render(&UpdateResult::new(document).to_string())
            }
            DocumentCommands::Delete(args) => {
                let document = self
                    .tracker
                    .delete_document(&self.actor, &args.into())
                    .await?;
                self.renderer.render(&DeleteResult::new(document).to_string())
            }
            DocumentCommands::List(args) => {
                let documents = self.tracker.list_documents(&args.into()).await?;
                let output = format!("# Documents\n\n{}", Documents(documents));
                self.renderer.render(&output)
            }
            DocumentCommands::Check(args) => {
                let report = self.tracker.check_documents(&args.into()).await?;
                let output = format!("# Required Documents\n\n{report}");
                self.renderer.render(&output)
            }
        }
    }
}
