//! Lead CRUD operations and lead status changes.

use jiff::Timestamp;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    activity_queries::{record_activity, NewActivity},
    step_queries::insert_missing_instances,
    utils::{
        ensure_version, get_id, non_blank, parse_column, parse_timestamp, version_conflict,
    },
};
use crate::{
    error::{DatabaseResultExt, Rejection, Result, WorkflowError},
    models::{ActivityAction, Actor, Lead, LeadStatus, Role},
    params::{AssignInstaller, ChangeLeadStatus, CreateLead},
    workflow::{engine, StatusVocabulary},
};

const INSERT_LEAD_SQL: &str = "INSERT INTO leads (customer_name, phone, address, status, installer, version, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, NULL, 0, ?5, ?5)";
const SELECT_LEAD_BY_ID_SQL: &str = "SELECT id, customer_name, phone, address, status, installer, version, created_at, updated_at FROM leads WHERE id = ?1";
const SELECT_LEADS_SQL: &str = "SELECT id, customer_name, phone, address, status, installer, version, created_at, updated_at FROM leads ORDER BY id";
const SELECT_LEADS_BY_STATUS_SQL: &str = "SELECT id, customer_name, phone, address, status, installer, version, created_at, updated_at FROM leads WHERE status = ?1 ORDER BY id";
const SELECT_LEAD_VERSION_SQL: &str = "SELECT version FROM leads WHERE id = ?1";
const UPDATE_LEAD_STATUS_SQL: &str = "UPDATE leads SET status = ?1, version = version + 1, updated_at = ?2 WHERE id = ?3 AND version = ?4";
const UPDATE_LEAD_INSTALLER_SQL: &str = "UPDATE leads SET installer = ?1, version = version + 1, updated_at = ?2 WHERE id = ?3 AND version = ?4";

fn build_lead_from_row(row: &Row) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: get_id(row, 0)?,
        customer_name: row.get(1)?,
        phone: row.get(2)?,
        address: row.get(3)?,
        status: parse_column(row, 4)?,
        installer: row.get(5)?,
        version: row.get::<_, i64>(6)? as u64,
        created_at: parse_timestamp(row, 7)?,
        updated_at: parse_timestamp(row, 8)?,
    })
}

/// Loads a lead or fails with [`WorkflowError::LeadNotFound`].
pub(crate) fn load_lead(conn: &Connection, lead_id: u64) -> Result<Lead> {
    conn.query_row(SELECT_LEAD_BY_ID_SQL, params![lead_id as i64], build_lead_from_row)
        .optional()
        .db_context("Failed to query lead")?
        .ok_or(WorkflowError::LeadNotFound { id: lead_id })
}

/// Maps an update that touched no rows to a version conflict.
fn ensure_lead_updated(conn: &Connection, lead: &Lead, changed: usize) -> Result<()> {
    if changed > 0 {
        return Ok(());
    }
    let actual: i64 = conn
        .query_row(SELECT_LEAD_VERSION_SQL, params![lead.id as i64], |row| {
            row.get(0)
        })
        .db_context("Failed to query lead version")?;
    Err(version_conflict("lead", lead.id, lead.version, actual as u64))
}

/// Writes a new status for `lead`, conditioned on its current version.
pub(crate) fn update_lead_status(
    conn: &Connection,
    lead: &Lead,
    status: LeadStatus,
    now: Timestamp,
) -> Result<Lead> {
    let changed = conn
        .execute(
            UPDATE_LEAD_STATUS_SQL,
            params![
                status.as_str(),
                now.to_string(),
                lead.id as i64,
                lead.version as i64
            ],
        )
        .db_context("Failed to update lead status")?;
    ensure_lead_updated(conn, lead, changed)?;

    Ok(Lead {
        status,
        version: lead.version + 1,
        updated_at: now,
        ..lead.clone()
    })
}

impl super::Database {
    /// Creates a lead in status `lead` with a pending instance of every
    /// current step definition.
    pub fn create_lead(&mut self, actor: &Actor, params: &CreateLead) -> Result<Lead> {
        if !matches!(actor.role, Role::Admin | Role::Office | Role::Sales) {
            return Err(Rejection::Permission {
                role: actor.role,
                action: "create leads".to_string(),
            }
            .into());
        }
        params.validate()?;

        let tx = self.immediate()?;
        let now = Timestamp::now();
        let now_str = now.to_string();
        let customer_name = params.customer_name.trim();
        let phone = non_blank(params.phone.as_deref());
        let address = non_blank(params.address.as_deref());

        tx.execute(
            INSERT_LEAD_SQL,
            params![
                customer_name,
                phone,
                address,
                LeadStatus::Lead.as_str(),
                &now_str
            ],
        )
        .db_context("Failed to insert lead")?;
        let id = tx.last_insert_rowid() as u64;

        let steps = insert_missing_instances(&tx, id, now)?;

        record_activity(
            &tx,
            NewActivity {
                lead_id: id,
                actor,
                action: ActivityAction::LeadCreated,
                details: format!("Lead created for {customer_name} with {steps} steps"),
                remarks: None,
            },
            &now_str,
        )?;

        tx.commit().db_context("Failed to commit transaction")?;
        info!("Lead {id} created by {}", actor.user);

        Ok(Lead {
            id,
            customer_name: customer_name.to_string(),
            phone: phone.map(String::from),
            address: address.map(String::from),
            status: LeadStatus::Lead,
            installer: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Lists leads, optionally restricted to one status.
    pub fn list_leads(&self, status: Option<LeadStatus>) -> Result<Vec<Lead>> {
        let (sql, status_str) = match status {
            Some(status) => (SELECT_LEADS_BY_STATUS_SQL, Some(status.as_str())),
            None => (SELECT_LEADS_SQL, None),
        };

        let mut stmt = self
            .connection
            .prepare(sql)
            .db_context("Failed to prepare query")?;

        let rows = match status_str {
            Some(status) => stmt.query_map(params![status], build_lead_from_row),
            None => stmt.query_map([], build_lead_from_row),
        };

        let leads = rows
            .db_context("Failed to query leads")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch leads")?;

        Ok(leads)
    }

    /// Retrieves a single lead by its ID.
    pub fn get_lead(&self, lead_id: u64) -> Result<Option<Lead>> {
        match load_lead(&self.connection, lead_id) {
            Ok(lead) => Ok(Some(lead)),
            Err(WorkflowError::LeadNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Manually moves a lead along the status graph.
    pub fn change_lead_status(
        &mut self,
        actor: &Actor,
        vocabulary: &StatusVocabulary,
        params: &ChangeLeadStatus,
    ) -> Result<Lead> {
        let tx = self.immediate()?;
        let lead = load_lead(&tx, params.lead_id)?;
        let target = engine::change_lead_status(vocabulary, actor, &lead, params.status)?;
        ensure_version("lead", lead.id, params.expected_version, lead.version)?;

        let now = Timestamp::now();
        let updated = update_lead_status(&tx, &lead, target, now)?;

        record_activity(
            &tx,
            NewActivity {
                lead_id: lead.id,
                actor,
                action: ActivityAction::LeadStatusChanged,
                details: format!("{} -> {}", lead.status.as_str(), target.as_str()),
                remarks: non_blank(params.remarks.as_deref()),
            },
            &now.to_string(),
        )?;

        tx.commit().db_context("Failed to commit transaction")?;
        info!(
            "Lead {} moved from {} to {} by {}",
            lead.id,
            lead.status.as_str(),
            target.as_str(),
            actor.user
        );

        Ok(updated)
    }

    /// Sets or clears the installer responsible for a lead.
    pub fn assign_installer(&mut self, actor: &Actor, params: &AssignInstaller) -> Result<Lead> {
        if !actor.role.manages_leads() {
            return Err(Rejection::Permission {
                role: actor.role,
                action: "assign installers".to_string(),
            }
            .into());
        }

        let tx = self.immediate()?;
        let lead = load_lead(&tx, params.lead_id)?;
        if lead.status.is_closed() && !actor.role.is_admin() {
            return Err(Rejection::ProjectClosed {
                status: lead.status,
            }
            .into());
        }

        let installer = non_blank(params.installer.as_deref());
        let now = Timestamp::now();
        let now_str = now.to_string();
        let changed = tx
            .execute(
                UPDATE_LEAD_INSTALLER_SQL,
                params![installer, &now_str, lead.id as i64, lead.version as i64],
            )
            .db_context("Failed to update installer")?;
        ensure_lead_updated(&tx, &lead, changed)?;

        let details = match installer {
            Some(installer) => format!("Installer set to {installer}"),
            None => "Installer cleared".to_string(),
        };
        record_activity(
            &tx,
            NewActivity {
                lead_id: lead.id,
                actor,
                action: ActivityAction::InstallerAssigned,
                details,
                remarks: None,
            },
            &now_str,
        )?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Lead {
            installer: installer.map(String::from),
            version: lead.version + 1,
            updated_at: now,
            ..lead
        })
    }
}
