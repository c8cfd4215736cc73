//! Timeline and step transition operations for the Tracker.

use super::Tracker;
use crate::{
    error::Result,
    models::{Actor, StepAction, StepInstance},
    params::{Id, StepRef, StepTransition},
    workflow::{CompletionDialog, Timeline},
};

impl Tracker {
    /// The timeline of a lead as `actor` sees it.
    ///
    /// Steps added to the template since the lead was created are
    /// instantiated as pending on the way.
    pub async fn timeline(&self, actor: &Actor, params: &Id) -> Result<Timeline> {
        let actor = actor.clone();
        let lead_id = params.id;
        self.with_db(move |db| db.timeline(&actor, lead_id)).await
    }

    /// Every step instance of a lead, including those whose definition was
    /// deleted.
    pub async fn step_history(&self, params: &Id) -> Result<Vec<StepInstance>> {
        let lead_id = params.id;
        self.with_db(move |db| db.list_step_instances(lead_id))
            .await
    }

    /// Opens the completion dialog for one step. Documents are always read
    /// fresh.
    pub async fn open_completion_dialog(
        &self,
        actor: &Actor,
        params: &StepRef,
    ) -> Result<CompletionDialog> {
        let actor = actor.clone();
        let step = *params;
        self.with_db(move |db| db.completion_dialog(&actor, &step))
            .await
    }

    pub async fn complete_step(
        &self,
        actor: &Actor,
        params: &StepTransition,
    ) -> Result<StepInstance> {
        self.transition(actor, params, StepAction::Complete).await
    }

    pub async fn halt_step(&self, actor: &Actor, params: &StepTransition) -> Result<StepInstance> {
        self.transition(actor, params, StepAction::Halt).await
    }

    pub async fn skip_step(&self, actor: &Actor, params: &StepTransition) -> Result<StepInstance> {
        self.transition(actor, params, StepAction::Skip).await
    }

    /// Sends a completed, halted or skipped step back to pending. Admin only.
    pub async fn reopen_step(
        &self,
        actor: &Actor,
        params: &StepTransition,
    ) -> Result<StepInstance> {
        self.transition(actor, params, StepAction::Reopen).await
    }

    /// Applies any step action.
    pub async fn transition(
        &self,
        actor: &Actor,
        params: &StepTransition,
        action: StepAction,
    ) -> Result<StepInstance> {
        let actor = actor.clone();
        let params = params.clone();
        self.with_db(move |db| db.transition_step(&actor, &params, action))
            .await
    }
}
