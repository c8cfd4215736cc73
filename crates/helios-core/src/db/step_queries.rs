//! Step instance queries and step transitions.

use jiff::Timestamp;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    activity_queries::{record_activity, NewActivity},
    definition_queries::{load_definition, load_definitions},
    document_queries::load_documents,
    lead_queries::load_lead,
    utils::{
        ensure_version, get_id, get_optional_id, parse_column, parse_json,
        parse_optional_timestamp, parse_timestamp, version_conflict,
    },
};
use crate::{
    error::{DatabaseResultExt, Result, WorkflowError},
    models::{ActivityAction, Actor, StepAction, StepDefinition, StepInstance},
    params::{StepRef, StepTransition},
    workflow::{
        engine, missing_instances, CompletionDialog, FulfillmentReport, StepContext, Timeline,
    },
};

const SELECT_INSTANCES_BY_LEAD_SQL: &str = "SELECT id, lead_id, definition_id, step_name, status, completed_by, completed_at, remarks, attachments, version, created_at, updated_at FROM step_instances WHERE lead_id = ?1 ORDER BY id";
const SELECT_INSTANCE_SQL: &str = "SELECT id, lead_id, definition_id, step_name, status, completed_by, completed_at, remarks, attachments, version, created_at, updated_at FROM step_instances WHERE lead_id = ?1 AND definition_id = ?2";
const INSERT_INSTANCE_SQL: &str = "INSERT OR IGNORE INTO step_instances (lead_id, definition_id, step_name, status, attachments, version, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, '[]', 0, ?5, ?5)";
const SELECT_INSTANCE_VERSION_SQL: &str = "SELECT version FROM step_instances WHERE id = ?1";
const UPDATE_INSTANCE_SQL: &str = "UPDATE step_instances SET status = ?1, completed_by = ?2, completed_at = ?3, remarks = ?4, attachments = ?5, version = ?6, updated_at = ?7 WHERE id = ?8 AND version = ?9";

fn build_instance_from_row(row: &Row) -> rusqlite::Result<StepInstance> {
    Ok(StepInstance {
        id: get_id(row, 0)?,
        lead_id: get_id(row, 1)?,
        definition_id: get_optional_id(row, 2)?,
        step_name: row.get(3)?,
        status: parse_column(row, 4)?,
        completed_by: row.get(5)?,
        completed_at: parse_optional_timestamp(row, 6)?,
        remarks: row.get(7)?,
        attachments: parse_json(row, 8)?,
        version: row.get::<_, i64>(9)? as u64,
        created_at: parse_timestamp(row, 10)?,
        updated_at: parse_timestamp(row, 11)?,
    })
}

/// Every instance of a lead, orphaned history included.
pub(crate) fn load_instances(conn: &Connection, lead_id: u64) -> Result<Vec<StepInstance>> {
    let mut stmt = conn
        .prepare(SELECT_INSTANCES_BY_LEAD_SQL)
        .db_context("Failed to prepare query")?;

    let instances = stmt
        .query_map(params![lead_id as i64], build_instance_from_row)
        .db_context("Failed to query step instances")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch step instances")?;

    Ok(instances)
}

fn insert_instance(conn: &Connection, instance: &StepInstance) -> Result<bool> {
    let changed = conn
        .execute(
            INSERT_INSTANCE_SQL,
            params![
                instance.lead_id as i64,
                instance.definition_id.map(|id| id as i64),
                &instance.step_name,
                instance.status.as_str(),
                instance.created_at.to_string()
            ],
        )
        .db_context("Failed to insert step instance")?;
    Ok(changed > 0)
}

/// Creates pending instances for every definition the lead lacks and
/// returns how many were created.
pub(crate) fn insert_missing_instances(
    conn: &Connection,
    lead_id: u64,
    now: Timestamp,
) -> Result<usize> {
    let definitions = load_definitions(conn)?;
    let existing = load_instances(conn, lead_id)?;

    let mut created = 0;
    for instance in missing_instances(lead_id, &definitions, &existing, now) {
        if insert_instance(conn, &instance)? {
            created += 1;
        }
    }
    Ok(created)
}

/// The lead's instance of `definition`, created pending if missing.
fn load_or_create_instance(
    conn: &Connection,
    lead_id: u64,
    definition: &StepDefinition,
) -> Result<StepInstance> {
    let lookup = |conn: &Connection| {
        conn.query_row(
            SELECT_INSTANCE_SQL,
            params![lead_id as i64, definition.id as i64],
            build_instance_from_row,
        )
        .optional()
        .db_context("Failed to query step instance")
    };

    if let Some(instance) = lookup(conn)? {
        return Ok(instance);
    }
    insert_instance(
        conn,
        &StepInstance::pending(lead_id, definition, Timestamp::now()),
    )?;
    lookup(conn)?.ok_or(WorkflowError::StepNotFound {
        lead_id,
        definition_id: definition.id,
    })
}

fn activity_for(action: StepAction) -> ActivityAction {
    match action {
        StepAction::Complete => ActivityAction::StepCompleted,
        StepAction::Halt => ActivityAction::StepHalted,
        StepAction::Skip => ActivityAction::StepSkipped,
        StepAction::Reopen => ActivityAction::StepReopened,
    }
}

impl super::Database {
    /// Builds the timeline of a lead, instantiating missing steps first.
    pub fn timeline(&mut self, actor: &Actor, lead_id: u64) -> Result<Timeline> {
        let tx = self.immediate()?;
        let lead = load_lead(&tx, lead_id)?;
        let created = insert_missing_instances(&tx, lead_id, Timestamp::now())?;
        let definitions = load_definitions(&tx)?;
        let instances = load_instances(&tx, lead_id)?;
        tx.commit().db_context("Failed to commit transaction")?;

        if created > 0 {
            debug!("Instantiated {created} new steps for lead {lead_id}");
        }

        Ok(Timeline::build(lead, &definitions, &instances, actor))
    }

    /// All step instances of a lead, including orphaned history.
    pub fn list_step_instances(&self, lead_id: u64) -> Result<Vec<StepInstance>> {
        load_lead(&self.connection, lead_id)?;
        load_instances(&self.connection, lead_id)
    }

    /// Reads everything the completion dialog shows, with the lead's
    /// documents fetched fresh.
    pub fn completion_dialog(&mut self, actor: &Actor, step: &StepRef) -> Result<CompletionDialog> {
        let tx = self.immediate()?;
        let lead = load_lead(&tx, step.lead_id)?;
        let definition = load_definition(&tx, step.definition_id)?;
        let instance = load_or_create_instance(&tx, lead.id, &definition)?;
        let documents = load_documents(&tx, lead.id)?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(CompletionDialog::open(
            actor,
            &lead,
            &definition,
            &instance,
            &documents,
        ))
    }

    /// Applies `action` to one step of a lead.
    ///
    /// The preconditions run against rows read inside the transaction and the
    /// write only lands if the instance version is unchanged.
    pub fn transition_step(
        &mut self,
        actor: &Actor,
        params: &StepTransition,
        action: StepAction,
    ) -> Result<StepInstance> {
        let tx = self.immediate()?;
        let lead = load_lead(&tx, params.lead_id)?;
        let definition = load_definition(&tx, params.definition_id)?;
        let instance = load_or_create_instance(&tx, lead.id, &definition)?;

        let documents = load_documents(&tx, lead.id)?;
        let fulfillment = FulfillmentReport::check(&definition, &documents);
        let ctx = StepContext {
            actor,
            lead: &lead,
            definition: &definition,
            instance: &instance,
            fulfillment: &fulfillment,
        };
        let request = params.request(action);
        let now = Timestamp::now();
        let next = engine::apply(&ctx, &request, now)?;

        if !definition.attachments_allowed && !next.attachments.is_empty() {
            return Err(WorkflowError::invalid_input(
                "attachments",
                format!("'{}' does not accept attachments", definition.name),
            ));
        }
        ensure_version(
            "step",
            instance.id,
            params.expected_version,
            instance.version,
        )?;

        let attachments = serde_json::to_string(&next.attachments)?;
        let changed = tx
            .execute(
                UPDATE_INSTANCE_SQL,
                params![
                    next.status.as_str(),
                    next.completed_by.as_deref(),
                    next.completed_at.map(|at| at.to_string()),
                    next.remarks.as_deref(),
                    attachments,
                    next.version as i64,
                    next.updated_at.to_string(),
                    instance.id as i64,
                    instance.version as i64
                ],
            )
            .db_context("Failed to update step instance")?;
        if changed == 0 {
            let actual: i64 = tx
                .query_row(SELECT_INSTANCE_VERSION_SQL, params![instance.id as i64], |row| {
                    row.get(0)
                })
                .db_context("Failed to query step version")?;
            return Err(version_conflict("step", instance.id, instance.version, actual as u64));
        }

        record_activity(
            &tx,
            NewActivity {
                lead_id: lead.id,
                actor,
                action: activity_for(action),
                details: format!(
                    "{}: {} -> {}",
                    definition.name,
                    instance.status.as_str(),
                    next.status.as_str()
                ),
                remarks: next.remarks.as_deref(),
            },
            &now.to_string(),
        )?;

        tx.commit().db_context("Failed to commit transaction")?;
        info!(
            "Step '{}' of lead {} is now {} ({} by {})",
            definition.name,
            lead.id,
            next.status.as_str(),
            action,
            actor.user
        );

        Ok(next)
    }
}
