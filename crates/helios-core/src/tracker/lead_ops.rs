//! Lead operations for the Tracker.

use super::Tracker;
use crate::{
    error::Result,
    models::{ActivityEntry, Actor, Lead},
    params::{AssignInstaller, ChangeLeadStatus, CreateLead, Id, ListLeads},
};

impl Tracker {
    /// Creates a lead and instantiates its timeline.
    pub async fn create_lead(&self, actor: &Actor, params: &CreateLead) -> Result<Lead> {
        let actor = actor.clone();
        let params = params.clone();
        self.with_db(move |db| db.create_lead(&actor, &params)).await
    }

    /// Lists leads, optionally filtered by status.
    pub async fn list_leads(&self, params: &ListLeads) -> Result<Vec<Lead>> {
        let status = params.status;
        self.with_db(move |db| db.list_leads(status)).await
    }

    /// Retrieves a lead by its ID.
    pub async fn get_lead(&self, params: &Id) -> Result<Option<Lead>> {
        let lead_id = params.id;
        self.with_db(move |db| db.get_lead(lead_id)).await
    }

    /// Moves a lead to another status along the allowed transitions.
    pub async fn change_lead_status(
        &self,
        actor: &Actor,
        params: &ChangeLeadStatus,
    ) -> Result<Lead> {
        let actor = actor.clone();
        let params = params.clone();
        let vocabulary = self.vocabulary.clone();
        self.with_db(move |db| db.change_lead_status(&actor, &vocabulary, &params))
            .await
    }

    pub async fn assign_installer(&self, actor: &Actor, params: &AssignInstaller) -> Result<Lead> {
        let actor = actor.clone();
        let params = params.clone();
        self.with_db(move |db| db.assign_installer(&actor, &params))
            .await
    }

    /// Activity log of a lead, oldest first.
    pub async fn lead_activity(&self, params: &Id) -> Result<Vec<ActivityEntry>> {
        let lead_id = params.id;
        self.with_db(move |db| db.lead_activity(lead_id)).await
    }
}
