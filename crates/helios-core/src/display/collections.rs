//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper renders its items in order and prints a short message when
//! empty, leaving titles to the caller.

use std::{fmt, ops::Index};

use super::datetime::LocalDateTime;
use crate::models::{ActivityEntry, Document, Lead, StepDefinition};

macro_rules! collection {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $name(pub Vec<$item>);

        impl $name {
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

collection!(
    /// Leads rendered as a compact list, one heading per lead.
    ///
    /// ```rust
    /// use helios_core::{display::Leads, models::{Lead, LeadStatus}};
    /// use jiff::Timestamp;
    ///
    /// let lead = Lead {
    ///     id: 1,
    ///     customer_name: "Meera Iyer".to_string(),
    ///     phone: None,
    ///     address: Some("14 Lake Road".to_string()),
    ///     status: LeadStatus::Interested,
    ///     installer: None,
    ///     version: 0,
    ///     created_at: Timestamp::now(),
    ///     updated_at: Timestamp::now(),
    /// };
    /// let output = Leads(vec![lead]).to_string();
    /// assert!(output.contains("Meera Iyer"));
    /// assert!(output.contains("lead_interested"));
    /// ```
    Leads,
    Lead
);

collection!(
    /// Step definitions in template order.
    Definitions,
    StepDefinition
);

collection!(Documents, Document);

collection!(ActivityLog, ActivityEntry);

impl fmt::Display for Leads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No leads found.");
        }
        for lead in &self.0 {
            writeln!(f, "## {} (ID: {})", lead.customer_name, lead.id)?;
            writeln!(f)?;
            writeln!(f, "- **Status**: {}", lead.status)?;
            if let Some(installer) = &lead.installer {
                writeln!(f, "- **Installer**: {installer}")?;
            }
            writeln!(f, "- **Created**: {}", LocalDateTime(&lead.created_at))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Definitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(
                f,
                "No step definitions. Run `helios definition seed` to install the defaults."
            );
        }
        for definition in &self.0 {
            write!(f, "{definition}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Documents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No documents uploaded.");
        }
        for document in &self.0 {
            write!(f, "{document}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ActivityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No activity recorded.");
        }
        for entry in &self.0 {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
