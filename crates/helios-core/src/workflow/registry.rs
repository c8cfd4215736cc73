//! Ordered step definitions and the rules that keep their positions dense.

use std::collections::{BTreeSet, HashSet};

use crate::{
    error::{Result, WorkflowError},
    models::{DocumentCategory, ProcessType, RequiredDocument, Role, StepDefinition},
};

/// Step definitions in template order.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    pub fn new(mut definitions: Vec<StepDefinition>) -> Self {
        definitions.sort_by_key(|definition| definition.order_index);
        Self { definitions }
    }

    pub fn ordered(&self) -> &[StepDefinition] {
        &self.definitions
    }

    pub fn into_inner(self) -> Vec<StepDefinition> {
        self.definitions
    }

    pub fn get(&self, id: u64) -> Option<&StepDefinition> {
        self.definitions.iter().find(|definition| definition.id == id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// True when order indexes run `1..=N` without gaps.
    pub fn is_dense(&self) -> bool {
        self.definitions
            .iter()
            .enumerate()
            .all(|(i, definition)| definition.order_index as usize == i + 1)
    }

    /// Position a new definition lands at. `None` appends.
    pub fn insertion_index(&self, position: Option<u32>) -> Result<u32> {
        let next = self.definitions.len() as u32 + 1;
        match position {
            None => Ok(next),
            Some(position) if (1..=next).contains(&position) => Ok(position),
            Some(position) => Err(WorkflowError::invalid_input(
                "position",
                format!("{position} is outside 1..={next}"),
            )),
        }
    }

    /// `(id, order_index)` pairs for a full reordering.
    ///
    /// `ids` must name every definition exactly once.
    pub fn reorder_plan(&self, ids: &[u64]) -> Result<Vec<(u64, u32)>> {
        if ids.len() != self.definitions.len() {
            return Err(WorkflowError::invalid_input(
                "ids",
                format!(
                    "expected {} definition ids, got {}",
                    self.definitions.len(),
                    ids.len()
                ),
            ));
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                return Err(WorkflowError::invalid_input(
                    "ids",
                    format!("definition {id} listed more than once"),
                ));
            }
            if self.get(*id).is_none() {
                return Err(WorkflowError::DefinitionNotFound { id: *id });
            }
        }

        Ok(ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i as u32 + 1))
            .collect())
    }

    /// `(id, order_index)` pairs for every definition left after removing
    /// `removed`.
    pub fn renumber_without(&self, removed: u64) -> Vec<(u64, u32)> {
        self.definitions
            .iter()
            .filter(|definition| definition.id != removed)
            .enumerate()
            .map(|(i, definition)| (definition.id, i as u32 + 1))
            .collect()
    }
}

/// Checks the fields an admin controls on a definition.
pub fn validate_definition(
    name: &str,
    allowed_roles: &BTreeSet<Role>,
    required_documents: &[RequiredDocument],
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(WorkflowError::invalid_input("name", "must not be empty"));
    }
    if allowed_roles.is_empty() {
        return Err(WorkflowError::invalid_input(
            "allowed_roles",
            "at least one role is required",
        ));
    }

    let mut categories = HashSet::new();
    for required in required_documents {
        if !categories.insert(required.category) {
            return Err(WorkflowError::invalid_input(
                "required_documents",
                format!("'{}' is listed more than once", required.category.as_str()),
            ));
        }
    }
    Ok(())
}

/// A definition of the standard template, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateStep {
    pub name: &'static str,
    pub description: &'static str,
    pub allowed_roles: BTreeSet<Role>,
    pub remarks_required: bool,
    pub attachments_allowed: bool,
    pub customer_upload: bool,
    pub requires_installer_assignment: bool,
    pub required_documents: Vec<RequiredDocument>,
}

impl TemplateStep {
    fn new(name: &'static str, description: &'static str, roles: &[Role]) -> Self {
        Self {
            name,
            description,
            allowed_roles: roles.iter().copied().collect(),
            remarks_required: false,
            attachments_allowed: false,
            customer_upload: false,
            requires_installer_assignment: false,
            required_documents: Vec::new(),
        }
    }

    fn remarks(mut self) -> Self {
        self.remarks_required = true;
        self
    }

    fn attachments(mut self) -> Self {
        self.attachments_allowed = true;
        self
    }

    fn customer_upload(mut self) -> Self {
        self.customer_upload = true;
        self
    }

    fn installer(mut self) -> Self {
        self.requires_installer_assignment = true;
        self
    }

    fn documents(mut self, documents: Vec<RequiredDocument>) -> Self {
        self.required_documents = documents;
        self
    }
}

/// The standard solar installation template, in order.
pub fn default_template() -> Vec<TemplateStep> {
    use DocumentCategory::*;
    use Role::*;

    vec![
        TemplateStep::new(
            "Site Survey",
            "Visit the site and record roof condition and shading",
            &[Sales, Installer],
        )
        .remarks()
        .attachments()
        .documents(vec![RequiredDocument::file(SitePhoto)]),
        TemplateStep::new(
            "Customer Documentation",
            "Collect identity, address and consumption proofs",
            &[Office, Sales],
        )
        .customer_upload()
        .documents(vec![
            RequiredDocument::file(AadhaarFront),
            RequiredDocument::file(AadhaarBack),
            RequiredDocument::file(PanCard),
            RequiredDocument::file(ElectricityBill),
            RequiredDocument::form(Profile),
        ]),
        TemplateStep::new(
            "Payment Verification",
            "Verify the advance against the customer's bank details",
            &[Office],
        )
        .documents(vec![
            RequiredDocument::file(BankPassbook).with_process(ProcessType::Verification),
        ]),
        TemplateStep::new(
            "Net Meter Application",
            "File the net metering application with the utility",
            &[Office],
        )
        .documents(vec![RequiredDocument::form(NetMeterApplication)]),
        TemplateStep::new(
            "Installation",
            "Mount panels, inverter and wiring",
            &[Installer],
        )
        .installer()
        .attachments()
        .documents(vec![RequiredDocument::file(InstallationPhoto)]),
        TemplateStep::new(
            "Commissioning & Inspection",
            "Commission the system and pass the utility inspection",
            &[Installer, Office],
        )
        .remarks()
        .documents(vec![RequiredDocument::file(CommissioningReport)]),
        TemplateStep::new(
            "Subsidy Claim",
            "Submit the subsidy claim on the customer's behalf",
            &[Office],
        )
        .documents(vec![RequiredDocument::form(SubsidyApplication)]),
        TemplateStep::new(
            "Handover",
            "Hand over warranty documents and close the project",
            &[Office, Sales],
        )
        .remarks()
        .documents(vec![
            RequiredDocument::file(WarrantyCard),
            RequiredDocument::file(Invoice),
        ]),
    ]
}
