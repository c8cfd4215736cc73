//! Roles and the acting user.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of roles that may act on a lead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, bypasses step role lists and closed-project locks
    Admin,
    /// Back-office staff handling paperwork and status changes
    Office,
    /// Field sales staff
    Sales,
    /// Installation crew
    Installer,
    /// The customer, through a self-service portal
    Customer,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Office,
        Role::Sales,
        Role::Installer,
        Role::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Office => "office",
            Role::Sales => "sales",
            Role::Installer => "installer",
            Role::Customer => "customer",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may move a lead's overall status by hand.
    pub fn manages_leads(&self) -> bool {
        match self {
            Role::Admin | Role::Office => true,
            Role::Sales | Role::Installer | Role::Customer => false,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "office" => Ok(Role::Office),
            "sales" => Ok(Role::Sales),
            "installer" => Ok(Role::Installer),
            "customer" => Ok(Role::Customer),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

/// The user performing an operation, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Actor {
    /// User reference recorded in completion metadata and the activity log
    pub user: String,
    /// Role the user acts under
    pub role: Role,
}

impl Actor {
    pub fn new(user: impl Into<String>, role: Role) -> Self {
        Self {
            user: user.into(),
            role,
        }
    }
}
