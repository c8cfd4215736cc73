//! Display implementations for domain models.
//!
//! Everything renders as markdown so the CLI can hand it to the terminal
//! renderer and the MCP server can return it verbatim.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    models::{
        ActivityEntry, Document, DocumentCategory, DocumentStatus, Lead, LeadStatus,
        RequiredDocument, Role, StepDefinition, StepInstance, StepStatus,
    },
    workflow::{
        BadgeVariant, CompletionDialog, FulfillmentReport, Timeline, TimelineEntry,
    },
};

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for BadgeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for RequiredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.category.label(),
            self.submission_type.as_str()
        )?;
        if let Some(process) = self.process_type {
            write!(f, ", {}", process.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.customer_name)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        if let Some(phone) = &self.phone {
            writeln!(f, "- Phone: {phone}")?;
        }
        if let Some(address) = &self.address {
            writeln!(f, "- Address: {address}")?;
        }
        match &self.installer {
            Some(installer) => writeln!(f, "- Installer: {installer}")?,
            None => writeln!(f, "- Installer: unassigned")?,
        }
        writeln!(f, "- Version: {}", self.version)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        Ok(())
    }
}

impl StepDefinition {
    fn flag_names(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.remarks_required {
            flags.push("remarks required");
        }
        if self.attachments_allowed {
            flags.push("attachments allowed");
        }
        if self.customer_upload {
            flags.push("customer upload");
        }
        if self.requires_installer_assignment {
            flags.push("installer required");
        }
        flags
    }
}

impl fmt::Display for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}. {} (ID: {})", self.order_index, self.name, self.id)?;
        writeln!(f)?;

        if let Some(description) = &self.description {
            writeln!(f, "{description}")?;
            writeln!(f)?;
        }

        let roles: Vec<&str> = std::iter::once("admin")
            .chain(
                self.allowed_roles
                    .iter()
                    .filter(|role| !role.is_admin())
                    .map(Role::as_str),
            )
            .collect();
        writeln!(f, "- **Roles**: {}", roles.join(", "))?;

        let flags = self.flag_names();
        if !flags.is_empty() {
            writeln!(f, "- **Flags**: {}", flags.join(", "))?;
        }

        if !self.required_documents.is_empty() {
            writeln!(f, "- **Documents**:")?;
            for required in &self.required_documents {
                writeln!(f, "  - {required}")?;
            }
        }
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for StepInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**{}** ({})", self.step_name, self.status.with_icon())?;
        if let (Some(by), Some(at)) = (&self.completed_by, &self.completed_at) {
            writeln!(f, "- By {by} at {}", LocalDateTime(at))?;
        }
        if let Some(remarks) = &self.remarks {
            writeln!(f, "- Remarks: {remarks}")?;
        }
        if !self.attachments.is_empty() {
            writeln!(f, "- Attachments: {}", self.attachments.join(", "))?;
        }
        writeln!(f, "- Version: {}", self.version)
    }
}

impl fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_next { " ← next" } else { "" };
        writeln!(
            f,
            "### {}. {} ({}){marker}",
            self.definition.order_index,
            self.definition.name,
            self.instance.status.with_icon()
        )?;
        writeln!(f)?;

        if let (Some(by), Some(at)) = (&self.instance.completed_by, &self.instance.completed_at) {
            writeln!(f, "- By {by} at {}", LocalDateTime(at))?;
        }
        if let Some(remarks) = &self.instance.remarks {
            writeln!(f, "- Remarks: {remarks}")?;
        }
        if !self.instance.attachments.is_empty() {
            writeln!(f, "- Attachments: {}", self.instance.attachments.join(", "))?;
        }
        if !self.can_act {
            writeln!(f, "- Read only")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.lead.id, self.lead.customer_name)?;
        writeln!(f)?;
        writeln!(f, "- Status: {}", self.lead.status)?;
        if let Some(installer) = &self.lead.installer {
            writeln!(f, "- Installer: {installer}")?;
        }
        writeln!(
            f,
            "- Progress: {}/{} ({}%)",
            self.progress.completed,
            self.progress.total,
            self.progress.percent()
        )?;

        if self.entries.is_empty() {
            return writeln!(f, "\nNo steps defined.");
        }

        writeln!(f, "\n## Steps")?;
        writeln!(f)?;
        for entry in &self.entries {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FulfillmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No documents required.");
        }
        for status in &self.requirements {
            let mark = if status.satisfied { "x" } else { " " };
            write!(f, "- [{mark}] {}", status.requirement)?;
            if let Some(id) = status.document_id {
                write!(f, " (document {id})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for CompletionDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (lead {})", self.step_name, self.lead_id)?;
        writeln!(f)?;
        writeln!(f, "- Status: {}", self.status.with_icon())?;
        writeln!(f, "- Version: {}", self.version)?;
        if self.remarks_required {
            writeln!(f, "- Remarks are required")?;
        }
        if self.attachments_allowed {
            writeln!(f, "- Attachments allowed")?;
        }
        if self.customer_upload {
            writeln!(f, "- Customer uploads documents")?;
        }
        if self.requires_installer_assignment {
            let state = if self.installer_assigned {
                "assigned"
            } else {
                "not assigned"
            };
            writeln!(f, "- Installer: {state}")?;
        }
        if !self.can_act {
            writeln!(f, "- Read only for your role")?;
        }

        if self.requirements.is_empty() {
            return Ok(());
        }

        writeln!(f, "\n### Required documents")?;
        writeln!(f)?;
        for requirement in &self.requirements {
            let mark = if requirement.satisfied { "x" } else { " " };
            let actions: Vec<&str> = requirement.actions.iter().map(|a| a.as_str()).collect();
            write!(
                f,
                "- [{mark}] {}: {}",
                requirement.requirement,
                actions.join(", ")
            )?;
            if let Some(id) = requirement.document_id {
                write!(f, " (document {id})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let submitted = if self.is_submitted { "submitted" } else { "draft" };
        writeln!(
            f,
            "- {}. {} `{}` ({}, {submitted}) by {} at {}",
            self.id,
            self.category.label(),
            self.file_name,
            self.status,
            self.uploaded_by,
            LocalDateTime(&self.created_at)
        )
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- {} **{}** ({}) {}: {}",
            LocalDateTime(&self.created_at),
            self.actor,
            self.actor_role,
            self.action.as_str(),
            self.details
        )?;
        if let Some(remarks) = &self.remarks {
            writeln!(f, "  > {remarks}")?;
        }
        Ok(())
    }
}
