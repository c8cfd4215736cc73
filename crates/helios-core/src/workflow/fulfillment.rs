//! Document fulfillment checking for step definitions.
//!
//! A required category is satisfied when the lead has a document of that
//! category that is both submitted and valid. Submission type (form or file)
//! only decides which action a front end offers; it never changes the result.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Document, DocumentCategory, RequiredDocument, StepDefinition};

/// Fulfillment of one required document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementStatus {
    pub requirement: RequiredDocument,
    pub satisfied: bool,
    /// The document that satisfies the requirement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<u64>,
}

/// Per-category fulfillment of a step's required documents, in definition
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FulfillmentReport {
    pub requirements: Vec<RequirementStatus>,
}

impl FulfillmentReport {
    /// Checks a step definition against one lead's documents.
    pub fn check(definition: &StepDefinition, documents: &[Document]) -> Self {
        Self::for_requirements(&definition.required_documents, documents)
    }

    pub fn for_requirements(requirements: &[RequiredDocument], documents: &[Document]) -> Self {
        let requirements = requirements
            .iter()
            .map(|requirement| {
                let document_id = documents
                    .iter()
                    .filter(|doc| doc.category == requirement.category)
                    .filter(|doc| doc.counts_as_submitted())
                    .map(|doc| doc.id)
                    .max();
                RequirementStatus {
                    requirement: *requirement,
                    satisfied: document_id.is_some(),
                    document_id,
                }
            })
            .collect();

        Self { requirements }
    }

    /// `{category → satisfied}`.
    pub fn as_map(&self) -> BTreeMap<DocumentCategory, bool> {
        self.requirements
            .iter()
            .map(|status| (status.requirement.category, status.satisfied))
            .collect()
    }

    /// Unsatisfied categories, in definition order.
    pub fn missing(&self) -> Vec<DocumentCategory> {
        self.requirements
            .iter()
            .filter(|status| !status.satisfied)
            .map(|status| status.requirement.category)
            .collect()
    }

    /// True when every requirement is met, including when there are none.
    pub fn all_satisfied(&self) -> bool {
        self.requirements.iter().all(|status| status.satisfied)
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn get(&self, category: DocumentCategory) -> Option<&RequirementStatus> {
        self.requirements
            .iter()
            .find(|status| status.requirement.category == category)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::DocumentStatus;

    fn document(
        id: u64,
        category: DocumentCategory,
        submitted: bool,
        status: DocumentStatus,
    ) -> Document {
        Document {
            id,
            lead_id: 1,
            category,
            file_name: format!("{}.pdf", category.as_str()),
            content_type: Some("application/pdf".to_string()),
            size_bytes: 1024,
            is_submitted: submitted,
            status,
            uploaded_by: "office-1".to_string(),
            created_at: Timestamp::from_second(1_700_000_000).unwrap(),
            updated_at: Timestamp::from_second(1_700_000_000).unwrap(),
        }
    }

    fn requirements() -> Vec<RequiredDocument> {
        vec![
            RequiredDocument::file(DocumentCategory::AadhaarFront),
            RequiredDocument::form(DocumentCategory::Profile),
        ]
    }

    #[test]
    fn test_partial_fulfillment() {
        let documents = vec![document(
            7,
            DocumentCategory::AadhaarFront,
            true,
            DocumentStatus::Valid,
        )];
        let report = FulfillmentReport::for_requirements(&requirements(), &documents);

        let map = report.as_map();
        assert!(map[&DocumentCategory::AadhaarFront]);
        assert!(!map[&DocumentCategory::Profile]);
        assert_eq!(report.missing(), vec![DocumentCategory::Profile]);
        assert!(!report.all_satisfied());
        assert_eq!(
            report.get(DocumentCategory::AadhaarFront).and_then(|s| s.document_id),
            Some(7)
        );
    }

    #[test]
    fn test_unsubmitted_and_invalid_documents_do_not_count() {
        let documents = vec![
            document(1, DocumentCategory::AadhaarFront, false, DocumentStatus::Valid),
            document(2, DocumentCategory::AadhaarFront, true, DocumentStatus::Corrupted),
            document(3, DocumentCategory::Profile, true, DocumentStatus::Replaced),
        ];
        let report = FulfillmentReport::for_requirements(&requirements(), &documents);

        assert_eq!(
            report.missing(),
            vec![DocumentCategory::AadhaarFront, DocumentCategory::Profile]
        );
    }

    #[test]
    fn test_submission_type_does_not_matter() {
        // A profile uploaded as a file still satisfies a form requirement.
        let documents = vec![
            document(4, DocumentCategory::AadhaarFront, true, DocumentStatus::Valid),
            document(5, DocumentCategory::Profile, true, DocumentStatus::Valid),
        ];
        let report = FulfillmentReport::for_requirements(&requirements(), &documents);
        assert!(report.all_satisfied());
    }

    #[test]
    fn test_no_requirements_is_satisfied() {
        let report = FulfillmentReport::for_requirements(&[], &[]);
        assert!(report.is_empty());
        assert!(report.all_satisfied());
        assert!(report.as_map().is_empty());
    }
}
