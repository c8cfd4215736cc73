//! Lead model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::LeadStatus;

/// A customer solar-installation project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    /// Unique identifier for the lead
    pub id: u64,

    /// Customer name
    pub customer_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Installation site address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Overall lifecycle status
    pub status: LeadStatus,

    /// Installer assigned to the project, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,

    /// Incremented on every write; used to detect concurrent updates
    pub version: u64,

    /// Timestamp when the lead was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the lead was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Lead {
    pub fn has_installer(&self) -> bool {
        self.installer
            .as_deref()
            .is_some_and(|installer| !installer.trim().is_empty())
    }
}
