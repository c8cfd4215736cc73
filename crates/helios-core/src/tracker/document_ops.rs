//! Document operations for the Tracker.

use super::Tracker;
use crate::{
    error::Result,
    models::{Actor, Document},
    params::{Id, StepRef, UploadDocument},
    workflow::FulfillmentReport,
};

impl Tracker {
    /// Records an uploaded file for a lead. File bytes are stored elsewhere.
    ///
    /// Submitting a valid `profile` moves a lead in `lead` or
    /// `lead_interested` to `lead_processing`.
    pub async fn upload_document(
        &self,
        actor: &Actor,
        params: &UploadDocument,
    ) -> Result<Document> {
        let actor = actor.clone();
        let params = params.clone();
        self.with_db(move |db| db.upload_document(&actor, &params))
            .await
    }

    pub async fn submit_document(&self, actor: &Actor, params: &Id) -> Result<Document> {
        let actor = actor.clone();
        let id = params.id;
        self.with_db(move |db| db.submit_document(&actor, id)).await
    }

    pub async fn mark_document_corrupted(&self, actor: &Actor, params: &Id) -> Result<Document> {
        let actor = actor.clone();
        let id = params.id;
        self.with_db(move |db| db.mark_document_corrupted(&actor, id))
            .await
    }

    pub async fn delete_document(&self, actor: &Actor, params: &Id) -> Result<Document> {
        let actor = actor.clone();
        let id = params.id;
        self.with_db(move |db| db.delete_document(&actor, id)).await
    }

    /// Every document of a lead, replaced and corrupted ones included.
    pub async fn list_documents(&self, params: &Id) -> Result<Vec<Document>> {
        let lead_id = params.id;
        self.with_db(move |db| db.list_documents(lead_id)).await
    }

    /// Which of a step's required documents the lead has satisfied.
    pub async fn check_documents(&self, params: &StepRef) -> Result<FulfillmentReport> {
        let step = *params;
        self.with_db(move |db| db.check_documents(step.lead_id, step.definition_id))
            .await
    }
}
