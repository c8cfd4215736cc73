//! Status labels, badge variants and the lead status adjacency table.

use std::collections::HashMap;

use crate::models::{DocumentStatus, LeadStatus, StepStatus};

/// Visual style a front end should use when rendering a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeVariant {
    Default,
    Secondary,
    Outline,
    Success,
    Warning,
    Destructive,
}

impl BadgeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeVariant::Default => "default",
            BadgeVariant::Secondary => "secondary",
            BadgeVariant::Outline => "outline",
            BadgeVariant::Success => "success",
            BadgeVariant::Warning => "warning",
            BadgeVariant::Destructive => "destructive",
        }
    }
}

/// Immutable lookup tables shared by the engine and the front ends.
///
/// Built once by [`StatusVocabulary::standard`] and handed around by
/// reference.
#[derive(Debug, Clone)]
pub struct StatusVocabulary {
    lead_labels: HashMap<LeadStatus, &'static str>,
    lead_variants: HashMap<LeadStatus, BadgeVariant>,
    step_labels: HashMap<StepStatus, &'static str>,
    step_variants: HashMap<StepStatus, BadgeVariant>,
    document_labels: HashMap<DocumentStatus, &'static str>,
    lead_transitions: HashMap<LeadStatus, Vec<LeadStatus>>,
}

impl StatusVocabulary {
    /// The vocabulary used by every lead.
    pub fn standard() -> Self {
        use LeadStatus::*;

        let lead_labels = HashMap::from([
            (Lead, "Lead"),
            (Interested, "Interested"),
            (Processing, "Processing"),
            (Completed, "Completed"),
            (Cancelled, "Cancelled"),
        ]);
        let lead_variants = HashMap::from([
            (Lead, BadgeVariant::Secondary),
            (Interested, BadgeVariant::Warning),
            (Processing, BadgeVariant::Default),
            (Completed, BadgeVariant::Success),
            (Cancelled, BadgeVariant::Destructive),
        ]);
        // Processing is only reached through the profile submission event,
        // never by hand.
        let lead_transitions = HashMap::from([
            (Lead, vec![Interested, Cancelled]),
            (Interested, vec![Cancelled]),
            (Processing, vec![Completed, Cancelled]),
            (Completed, vec![]),
            (Cancelled, vec![]),
        ]);

        let step_labels = HashMap::from([
            (StepStatus::Pending, "Pending"),
            (StepStatus::Completed, "Completed"),
            (StepStatus::Halted, "Halted"),
            (StepStatus::Skipped, "Skipped"),
        ]);
        let step_variants = HashMap::from([
            (StepStatus::Pending, BadgeVariant::Outline),
            (StepStatus::Completed, BadgeVariant::Success),
            (StepStatus::Halted, BadgeVariant::Destructive),
            (StepStatus::Skipped, BadgeVariant::Secondary),
        ]);

        let document_labels = HashMap::from([
            (DocumentStatus::Valid, "Valid"),
            (DocumentStatus::Corrupted, "Corrupted"),
            (DocumentStatus::Replaced, "Replaced"),
        ]);

        Self {
            lead_labels,
            lead_variants,
            step_labels,
            step_variants,
            document_labels,
            lead_transitions,
        }
    }

    pub fn lead_label(&self, status: LeadStatus) -> &'static str {
        self.lead_labels.get(&status).copied().unwrap_or(status.as_str())
    }

    pub fn lead_variant(&self, status: LeadStatus) -> BadgeVariant {
        self.lead_variants
            .get(&status)
            .copied()
            .unwrap_or(BadgeVariant::Default)
    }

    pub fn step_label(&self, status: StepStatus) -> &'static str {
        self.step_labels.get(&status).copied().unwrap_or(status.as_str())
    }

    pub fn step_variant(&self, status: StepStatus) -> BadgeVariant {
        self.step_variants
            .get(&status)
            .copied()
            .unwrap_or(BadgeVariant::Default)
    }

    pub fn document_label(&self, status: DocumentStatus) -> &'static str {
        self.document_labels
            .get(&status)
            .copied()
            .unwrap_or(status.as_str())
    }

    /// Targets reachable from `from` through a manual status change.
    pub fn lead_targets(&self, from: LeadStatus) -> &[LeadStatus] {
        self.lead_transitions
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn allows_lead_transition(&self, from: LeadStatus, to: LeadStatus) -> bool {
        self.lead_targets(from).contains(&to)
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_status_has_label_and_variant() {
        let vocabulary = StatusVocabulary::standard();
        for status in LeadStatus::ALL {
            assert!(vocabulary.lead_labels.contains_key(&status));
            assert!(vocabulary.lead_variants.contains_key(&status));
            assert!(vocabulary.lead_transitions.contains_key(&status));
        }
        for status in StepStatus::ALL {
            assert!(vocabulary.step_labels.contains_key(&status));
            assert!(vocabulary.step_variants.contains_key(&status));
        }
        for status in DocumentStatus::ALL {
            assert!(vocabulary.document_labels.contains_key(&status));
        }
    }

    #[test]
    fn test_lead_adjacency() {
        let vocabulary = StatusVocabulary::standard();
        assert!(vocabulary.allows_lead_transition(LeadStatus::Lead, LeadStatus::Interested));
        assert!(vocabulary.allows_lead_transition(LeadStatus::Lead, LeadStatus::Cancelled));
        assert!(!vocabulary.allows_lead_transition(LeadStatus::Lead, LeadStatus::Processing));
        assert!(!vocabulary.allows_lead_transition(
            LeadStatus::Interested,
            LeadStatus::Processing
        ));
        assert!(vocabulary.allows_lead_transition(
            LeadStatus::Processing,
            LeadStatus::Completed
        ));
        assert!(vocabulary.lead_targets(LeadStatus::Completed).is_empty());
        assert!(vocabulary.lead_targets(LeadStatus::Cancelled).is_empty());
    }

    #[test]
    fn test_transitions_never_go_backwards() {
        let vocabulary = StatusVocabulary::standard();
        let rank = |status: LeadStatus| match status {
            LeadStatus::Lead => 0,
            LeadStatus::Interested => 1,
            LeadStatus::Processing => 2,
            LeadStatus::Completed | LeadStatus::Cancelled => 3,
        };
        for from in LeadStatus::ALL {
            for to in vocabulary.lead_targets(from) {
                assert!(rank(*to) > rank(from), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn test_labels() {
        let vocabulary = StatusVocabulary::standard();
        assert_eq!(vocabulary.lead_label(LeadStatus::Processing), "Processing");
        assert_eq!(
            vocabulary.lead_variant(LeadStatus::Cancelled),
            BadgeVariant::Destructive
        );
        assert_eq!(vocabulary.step_label(StepStatus::Halted), "Halted");
        assert_eq!(
            vocabulary.step_variant(StepStatus::Completed).as_str(),
            "success"
        );
    }
}
