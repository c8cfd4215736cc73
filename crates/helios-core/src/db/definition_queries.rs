//! Step definition administration.
//!
//! `order_index` carries a UNIQUE constraint, so every reordering writes the
//! new positions negated first and flips them back in a second statement.

use std::collections::BTreeSet;

use jiff::Timestamp;
use log::info;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use super::utils::{get_id, parse_json, parse_timestamp};
use crate::{
    error::{DatabaseResultExt, Rejection, Result, WorkflowError},
    models::{Actor, Role, StepDefinition},
    params::{CreateDefinition, EditDefinition},
    workflow::{default_template, validate_definition, StepRegistry},
};

const SELECT_DEFINITIONS_SQL: &str = "SELECT id, name, description, order_index, allowed_roles, remarks_required, attachments_allowed, customer_upload, requires_installer_assignment, required_documents, created_at, updated_at FROM step_definitions ORDER BY order_index";
const SELECT_DEFINITION_BY_ID_SQL: &str = "SELECT id, name, description, order_index, allowed_roles, remarks_required, attachments_allowed, customer_upload, requires_installer_assignment, required_documents, created_at, updated_at FROM step_definitions WHERE id = ?1";
const INSERT_DEFINITION_SQL: &str = "INSERT INTO step_definitions (name, description, order_index, allowed_roles, remarks_required, attachments_allowed, customer_upload, requires_installer_assignment, required_documents, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)";
const UPDATE_DEFINITION_SQL: &str = "UPDATE step_definitions SET name = ?1, description = ?2, allowed_roles = ?3, remarks_required = ?4, attachments_allowed = ?5, customer_upload = ?6, requires_installer_assignment = ?7, required_documents = ?8, updated_at = ?9 WHERE id = ?10";
const DELETE_DEFINITION_SQL: &str = "DELETE FROM step_definitions WHERE id = ?1";
const COUNT_INSTANCES_SQL: &str = "SELECT COUNT(*) FROM step_instances WHERE definition_id = ?1";
const SHIFT_ORDERS_TEMP_SQL: &str =
    "UPDATE step_definitions SET order_index = -(order_index + 1) WHERE order_index >= ?1";
const SET_ORDER_TEMP_SQL: &str =
    "UPDATE step_definitions SET order_index = -?1, updated_at = ?2 WHERE id = ?3";
const RESTORE_ORDERS_SQL: &str =
    "UPDATE step_definitions SET order_index = -order_index WHERE order_index < 0";

fn encode_roles(roles: &BTreeSet<Role>) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(",")
}

fn decode_roles(row: &Row, idx: usize) -> rusqlite::Result<BTreeSet<Role>> {
    let raw: String = row.get(idx)?;
    raw.split(',')
        .filter(|role| !role.is_empty())
        .map(|role| {
            role.parse::<Role>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
            })
        })
        .collect()
}

fn build_definition_from_row(row: &Row) -> rusqlite::Result<StepDefinition> {
    Ok(StepDefinition {
        id: get_id(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        order_index: row.get::<_, i64>(3)? as u32,
        allowed_roles: decode_roles(row, 4)?,
        remarks_required: row.get(5)?,
        attachments_allowed: row.get(6)?,
        customer_upload: row.get(7)?,
        requires_installer_assignment: row.get(8)?,
        required_documents: parse_json(row, 9)?,
        created_at: parse_timestamp(row, 10)?,
        updated_at: parse_timestamp(row, 11)?,
    })
}

/// All definitions in template order.
pub(crate) fn load_definitions(conn: &Connection) -> Result<Vec<StepDefinition>> {
    let mut stmt = conn
        .prepare(SELECT_DEFINITIONS_SQL)
        .db_context("Failed to prepare query")?;

    let definitions = stmt
        .query_map([], build_definition_from_row)
        .db_context("Failed to query step definitions")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch step definitions")?;

    Ok(definitions)
}

pub(crate) fn load_definition(conn: &Connection, id: u64) -> Result<StepDefinition> {
    conn.query_row(
        SELECT_DEFINITION_BY_ID_SQL,
        params![id as i64],
        build_definition_from_row,
    )
    .optional()
    .db_context("Failed to query step definition")?
    .ok_or(WorkflowError::DefinitionNotFound { id })
}

fn ensure_admin(actor: &Actor) -> Result<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(Rejection::Permission {
            role: actor.role,
            action: "manage step definitions".to_string(),
        }
        .into())
    }
}

/// Inserts `definition` at its `order_index` and returns the stored copy.
fn insert_definition(conn: &Connection, definition: StepDefinition) -> Result<StepDefinition> {
    let required_documents = serde_json::to_string(&definition.required_documents)?;
    conn.execute(
        INSERT_DEFINITION_SQL,
        params![
            &definition.name,
            definition.description.as_deref(),
            definition.order_index as i64,
            encode_roles(&definition.allowed_roles),
            definition.remarks_required,
            definition.attachments_allowed,
            definition.customer_upload,
            definition.requires_installer_assignment,
            required_documents,
            definition.created_at.to_string()
        ],
    )
    .db_context("Failed to insert step definition")?;

    Ok(StepDefinition {
        id: conn.last_insert_rowid() as u64,
        ..definition
    })
}

/// Writes `(id, order_index)` pairs without tripping the UNIQUE constraint.
fn apply_positions(conn: &Connection, positions: &[(u64, u32)], now: &str) -> Result<()> {
    for (id, order_index) in positions {
        conn.execute(
            SET_ORDER_TEMP_SQL,
            params![*order_index as i64, now, *id as i64],
        )
        .db_context("Failed to update step order")?;
    }
    conn.execute(RESTORE_ORDERS_SQL, [])
        .db_context("Failed to restore step order")?;
    Ok(())
}

impl super::Database {
    /// Retrieves all step definitions in template order.
    pub fn list_definitions(&self) -> Result<Vec<StepDefinition>> {
        load_definitions(&self.connection)
    }

    pub fn get_definition(&self, id: u64) -> Result<StepDefinition> {
        load_definition(&self.connection, id)
    }

    /// Adds a definition at the requested position, shifting later ones.
    pub fn create_definition(
        &mut self,
        actor: &Actor,
        params: &CreateDefinition,
    ) -> Result<StepDefinition> {
        ensure_admin(actor)?;
        let allowed_roles = params.role_set();
        validate_definition(&params.name, &allowed_roles, &params.required_documents)?;

        let tx = self.immediate()?;
        let registry = StepRegistry::new(load_definitions(&tx)?);
        let order_index = registry.insertion_index(params.position)?;

        tx.execute(SHIFT_ORDERS_TEMP_SQL, params![order_index as i64])
            .db_context("Failed to shift step order")?;
        tx.execute(RESTORE_ORDERS_SQL, [])
            .db_context("Failed to restore step order")?;

        let now = Timestamp::now();
        let definition = insert_definition(
            &tx,
            StepDefinition {
                id: 0,
                name: params.name.trim().to_string(),
                description: super::utils::non_blank(params.description.as_deref())
                    .map(String::from),
                order_index,
                allowed_roles,
                remarks_required: params.remarks_required,
                attachments_allowed: params.attachments_allowed,
                customer_upload: params.customer_upload,
                requires_installer_assignment: params.requires_installer_assignment,
                required_documents: params.required_documents.clone(),
                created_at: now,
                updated_at: now,
            },
        )?;

        tx.commit().db_context("Failed to commit transaction")?;
        info!(
            "Step definition '{}' created at position {}",
            definition.name, definition.order_index
        );

        Ok(definition)
    }

    /// Applies a partial update to a definition.
    pub fn edit_definition(
        &mut self,
        actor: &Actor,
        params: &EditDefinition,
    ) -> Result<StepDefinition> {
        ensure_admin(actor)?;

        let tx = self.immediate()?;
        let mut definition = load_definition(&tx, params.id)?;

        if let Some(name) = &params.name {
            definition.name = name.trim().to_string();
        }
        if let Some(description) = &params.description {
            definition.description = super::utils::non_blank(Some(description)).map(String::from);
        }
        if let Some(roles) = &params.allowed_roles {
            definition.allowed_roles = roles.iter().copied().collect();
        }
        if let Some(value) = params.remarks_required {
            definition.remarks_required = value;
        }
        if let Some(value) = params.attachments_allowed {
            definition.attachments_allowed = value;
        }
        if let Some(value) = params.customer_upload {
            definition.customer_upload = value;
        }
        if let Some(value) = params.requires_installer_assignment {
            definition.requires_installer_assignment = value;
        }
        if let Some(documents) = &params.required_documents {
            definition.required_documents = documents.clone();
        }
        validate_definition(
            &definition.name,
            &definition.allowed_roles,
            &definition.required_documents,
        )?;

        definition.updated_at = Timestamp::now();
        let required_documents = serde_json::to_string(&definition.required_documents)?;
        tx.execute(
            UPDATE_DEFINITION_SQL,
            params![
                &definition.name,
                definition.description.as_deref(),
                encode_roles(&definition.allowed_roles),
                definition.remarks_required,
                definition.attachments_allowed,
                definition.customer_upload,
                definition.requires_installer_assignment,
                required_documents,
                definition.updated_at.to_string(),
                definition.id as i64
            ],
        )
        .db_context("Failed to update step definition")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(definition)
    }

    /// Removes a definition and closes the gap it leaves.
    ///
    /// Existing step instances survive with their definition reference
    /// cleared.
    pub fn delete_definition(&mut self, actor: &Actor, id: u64) -> Result<StepDefinition> {
        ensure_admin(actor)?;

        let tx = self.immediate()?;
        let registry = StepRegistry::new(load_definitions(&tx)?);
        let definition = registry
            .get(id)
            .cloned()
            .ok_or(WorkflowError::DefinitionNotFound { id })?;

        let orphaned: i64 = tx
            .query_row(COUNT_INSTANCES_SQL, params![id as i64], |row| row.get(0))
            .db_context("Failed to count step instances")?;

        tx.execute(DELETE_DEFINITION_SQL, params![id as i64])
            .db_context("Failed to delete step definition")?;
        apply_positions(
            &tx,
            &registry.renumber_without(id),
            &Timestamp::now().to_string(),
        )?;

        tx.commit().db_context("Failed to commit transaction")?;
        info!(
            "Step definition '{}' deleted; {orphaned} step instances kept as history",
            definition.name
        );

        Ok(definition)
    }

    /// Assigns positions `1..N` in the order of `ids`.
    pub fn reorder_definitions(
        &mut self,
        actor: &Actor,
        ids: &[u64],
    ) -> Result<Vec<StepDefinition>> {
        ensure_admin(actor)?;

        let tx = self.immediate()?;
        let registry = StepRegistry::new(load_definitions(&tx)?);
        let plan = registry.reorder_plan(ids)?;
        apply_positions(&tx, &plan, &Timestamp::now().to_string())?;
        let definitions = load_definitions(&tx)?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(definitions)
    }

    /// Installs the standard template into an empty registry.
    ///
    /// Returns the created definitions; nothing is created when definitions
    /// already exist.
    pub fn seed_default_definitions(&mut self, actor: &Actor) -> Result<Vec<StepDefinition>> {
        ensure_admin(actor)?;

        let tx = self.immediate()?;
        if !load_definitions(&tx)?.is_empty() {
            return Ok(Vec::new());
        }

        let now = Timestamp::now();
        let mut created = Vec::new();
        for (i, step) in default_template().into_iter().enumerate() {
            created.push(insert_definition(
                &tx,
                StepDefinition {
                    id: 0,
                    name: step.name.to_string(),
                    description: Some(step.description.to_string()),
                    order_index: i as u32 + 1,
                    allowed_roles: step.allowed_roles,
                    remarks_required: step.remarks_required,
                    attachments_allowed: step.attachments_allowed,
                    customer_upload: step.customer_upload,
                    requires_installer_assignment: step.requires_installer_assignment,
                    required_documents: step.required_documents,
                    created_at: now,
                    updated_at: now,
                },
            )?);
        }

        tx.commit().db_context("Failed to commit transaction")?;
        info!("Seeded {} default step definitions", created.len());

        Ok(created)
    }
}
