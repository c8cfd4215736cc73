//! Documents and document requirements.

use std::str::FromStr;

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::DocumentStatus;

/// Controlled vocabulary of document categories a lead can carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    AadhaarFront,
    AadhaarBack,
    PanCard,
    ElectricityBill,
    BankPassbook,
    /// Customer profile, captured through a form
    Profile,
    SitePhoto,
    InstallationPhoto,
    NetMeterApplication,
    CommissioningReport,
    SubsidyApplication,
    Invoice,
    WarrantyCard,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 13] = [
        DocumentCategory::AadhaarFront,
        DocumentCategory::AadhaarBack,
        DocumentCategory::PanCard,
        DocumentCategory::ElectricityBill,
        DocumentCategory::BankPassbook,
        DocumentCategory::Profile,
        DocumentCategory::SitePhoto,
        DocumentCategory::InstallationPhoto,
        DocumentCategory::NetMeterApplication,
        DocumentCategory::CommissioningReport,
        DocumentCategory::SubsidyApplication,
        DocumentCategory::Invoice,
        DocumentCategory::WarrantyCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::AadhaarFront => "aadhaar_front",
            DocumentCategory::AadhaarBack => "aadhaar_back",
            DocumentCategory::PanCard => "pan_card",
            DocumentCategory::ElectricityBill => "electricity_bill",
            DocumentCategory::BankPassbook => "bank_passbook",
            DocumentCategory::Profile => "profile",
            DocumentCategory::SitePhoto => "site_photo",
            DocumentCategory::InstallationPhoto => "installation_photo",
            DocumentCategory::NetMeterApplication => "net_meter_application",
            DocumentCategory::CommissioningReport => "commissioning_report",
            DocumentCategory::SubsidyApplication => "subsidy_application",
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::WarrantyCard => "warranty_card",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::AadhaarFront => "Aadhaar (front)",
            DocumentCategory::AadhaarBack => "Aadhaar (back)",
            DocumentCategory::PanCard => "PAN card",
            DocumentCategory::ElectricityBill => "Electricity bill",
            DocumentCategory::BankPassbook => "Bank passbook",
            DocumentCategory::Profile => "Customer profile",
            DocumentCategory::SitePhoto => "Site photo",
            DocumentCategory::InstallationPhoto => "Installation photo",
            DocumentCategory::NetMeterApplication => "Net meter application",
            DocumentCategory::CommissioningReport => "Commissioning report",
            DocumentCategory::SubsidyApplication => "Subsidy application",
            DocumentCategory::Invoice => "Invoice",
            DocumentCategory::WarrantyCard => "Warranty card",
        }
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        DocumentCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| format!("Invalid document category: {s}"))
    }
}

/// How a required document is supplied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    /// Structured form filled in the application
    Form,
    /// Raw file upload
    File,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Form => "form",
            SubmissionType::File => "file",
        }
    }
}

impl FromStr for SubmissionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "form" => Ok(SubmissionType::Form),
            "file" => Ok(SubmissionType::File),
            _ => Err(format!("Invalid submission type: {s}")),
        }
    }
}

/// Whether the step collects the document or verifies one collected earlier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Submission,
    Verification,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Submission => "submission",
            ProcessType::Verification => "verification",
        }
    }
}

impl FromStr for ProcessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submission" => Ok(ProcessType::Submission),
            "verification" => Ok(ProcessType::Verification),
            _ => Err(format!("Invalid process type: {s}")),
        }
    }
}

/// A document a step definition needs before it can be completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RequiredDocument {
    pub category: DocumentCategory,
    pub submission_type: SubmissionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_type: Option<ProcessType>,
}

impl RequiredDocument {
    pub fn file(category: DocumentCategory) -> Self {
        Self {
            category,
            submission_type: SubmissionType::File,
            process_type: None,
        }
    }

    pub fn form(category: DocumentCategory) -> Self {
        Self {
            category,
            submission_type: SubmissionType::Form,
            process_type: None,
        }
    }

    pub fn with_process(mut self, process_type: ProcessType) -> Self {
        self.process_type = Some(process_type);
        self
    }
}

impl FromStr for RequiredDocument {
    type Err = String;

    /// Parses `category:form|file[:submission|verification]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let category = parts
            .next()
            .ok_or_else(|| format!("Invalid required document: {s}"))?
            .parse::<DocumentCategory>()?;
        let submission_type = match parts.next() {
            Some(kind) => kind.parse::<SubmissionType>()?,
            None => SubmissionType::File,
        };
        let process_type = parts.next().map(str::parse::<ProcessType>).transpose()?;
        if parts.next().is_some() {
            return Err(format!("Invalid required document: {s}"));
        }

        Ok(Self {
            category,
            submission_type,
            process_type,
        })
    }
}

/// An uploaded artifact attached to a lead. File bytes live in external
/// object storage; only metadata is tracked here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: u64,
    pub lead_id: u64,
    pub category: DocumentCategory,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub size_bytes: u64,
    /// Whether the uploader finalised the document
    pub is_submitted: bool,
    pub status: DocumentStatus,
    pub uploaded_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    /// Counts toward step completion only when submitted and still valid.
    pub fn counts_as_submitted(&self) -> bool {
        self.is_submitted && self.status == DocumentStatus::Valid
    }
}
