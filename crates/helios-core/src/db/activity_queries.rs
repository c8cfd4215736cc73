//! Activity log writes and queries.

use rusqlite::{params, Connection, Row};

use super::utils::{get_id, parse_column, parse_timestamp};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{ActivityAction, ActivityEntry, Actor},
};

const INSERT_ACTIVITY_SQL: &str = "INSERT INTO activity_logs (lead_id, actor, actor_role, action, details, remarks, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const SELECT_ACTIVITY_BY_LEAD_SQL: &str = "SELECT id, lead_id, actor, actor_role, action, details, remarks, created_at FROM activity_logs WHERE lead_id = ?1 ORDER BY id";

/// An activity row about to be written.
pub(crate) struct NewActivity<'a> {
    pub lead_id: u64,
    pub actor: &'a Actor,
    pub action: ActivityAction,
    pub details: String,
    pub remarks: Option<&'a str>,
}

/// Appends to the activity log inside the caller's transaction.
pub(crate) fn record_activity(
    conn: &Connection,
    activity: NewActivity<'_>,
    now: &str,
) -> Result<()> {
    conn.execute(
        INSERT_ACTIVITY_SQL,
        params![
            activity.lead_id as i64,
            &activity.actor.user,
            activity.actor.role.as_str(),
            activity.action.as_str(),
            &activity.details,
            activity.remarks,
            now
        ],
    )
    .db_context("Failed to record activity")?;
    Ok(())
}

fn build_activity_from_row(row: &Row) -> rusqlite::Result<ActivityEntry> {
    Ok(ActivityEntry {
        id: get_id(row, 0)?,
        lead_id: get_id(row, 1)?,
        actor: row.get(2)?,
        actor_role: parse_column(row, 3)?,
        action: parse_column(row, 4)?,
        details: row.get(5)?,
        remarks: row.get(6)?,
        created_at: parse_timestamp(row, 7)?,
    })
}

impl super::Database {
    /// Activity log of a lead, oldest first.
    pub fn lead_activity(&self, lead_id: u64) -> Result<Vec<ActivityEntry>> {
        super::lead_queries::load_lead(&self.connection, lead_id)?;

        let mut stmt = self
            .connection
            .prepare(SELECT_ACTIVITY_BY_LEAD_SQL)
            .db_context("Failed to prepare query")?;

        let entries = stmt
            .query_map(params![lead_id as i64], build_activity_from_row)
            .db_context("Failed to query activity")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch activity")?;

        Ok(entries)
    }
}
