//! Step definition operations for the Tracker.
//!
//! Every mutation here is admin only.

use super::Tracker;
use crate::{
    error::Result,
    models::{Actor, StepDefinition},
    params::{CreateDefinition, EditDefinition, Id, ReorderDefinitions},
};

impl Tracker {
    /// All step definitions in template order.
    pub async fn list_definitions(&self) -> Result<Vec<StepDefinition>> {
        self.with_db(|db| db.list_definitions()).await
    }

    pub async fn create_definition(
        &self,
        actor: &Actor,
        params: &CreateDefinition,
    ) -> Result<StepDefinition> {
        let actor = actor.clone();
        let params = params.clone();
        self.with_db(move |db| db.create_definition(&actor, &params))
            .await
    }

    pub async fn edit_definition(
        &self,
        actor: &Actor,
        params: &EditDefinition,
    ) -> Result<StepDefinition> {
        let actor = actor.clone();
        let params = params.clone();
        self.with_db(move |db| db.edit_definition(&actor, &params))
            .await
    }

    /// Deletes a definition. Step instances already created from it stay in
    /// storage as orphaned history.
    pub async fn delete_definition(&self, actor: &Actor, params: &Id) -> Result<StepDefinition> {
        let actor = actor.clone();
        let id = params.id;
        self.with_db(move |db| db.delete_definition(&actor, id))
            .await
    }

    pub async fn reorder_definitions(
        &self,
        actor: &Actor,
        params: &ReorderDefinitions,
    ) -> Result<Vec<StepDefinition>> {
        let actor = actor.clone();
        let ids = params.ids.clone();
        self.with_db(move |db| db.reorder_definitions(&actor, &ids))
            .await
    }

    /// Installs the standard solar template when no definitions exist.
    pub async fn seed_default_definitions(&self, actor: &Actor) -> Result<Vec<StepDefinition>> {
        let actor = actor.clone();
        self.with_db(move |db| db.seed_default_definitions(&actor))
            .await
    }
}
