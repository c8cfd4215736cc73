//! Document register: uploads, submission, corruption marks and deletion.

use jiff::Timestamp;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    activity_queries::{record_activity, NewActivity},
    definition_queries::load_definition,
    lead_queries::{load_lead, update_lead_status},
    utils::{get_id, parse_column, parse_timestamp},
};
use crate::{
    error::{DatabaseResultExt, Rejection, Result, WorkflowError},
    models::{ActivityAction, Actor, Document, DocumentCategory, DocumentStatus, Lead},
    params::UploadDocument,
    workflow::{engine, FulfillmentReport, LeadEvent},
};

const SELECT_DOCUMENTS_BY_LEAD_SQL: &str = "SELECT id, lead_id, category, file_name, content_type, size_bytes, is_submitted, status, uploaded_by, created_at, updated_at FROM documents WHERE lead_id = ?1 ORDER BY id";
const SELECT_DOCUMENT_BY_ID_SQL: &str = "SELECT id, lead_id, category, file_name, content_type, size_bytes, is_submitted, status, uploaded_by, created_at, updated_at FROM documents WHERE id = ?1";
const INSERT_DOCUMENT_SQL: &str = "INSERT INTO documents (lead_id, category, file_name, content_type, size_bytes, is_submitted, status, uploaded_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)";
const REPLACE_VALID_DOCUMENTS_SQL: &str = "UPDATE documents SET status = 'replaced', updated_at = ?1 WHERE lead_id = ?2 AND category = ?3 AND status = 'valid'";
const SUBMIT_DOCUMENT_SQL: &str =
    "UPDATE documents SET is_submitted = 1, updated_at = ?1 WHERE id = ?2";
const UPDATE_DOCUMENT_STATUS_SQL: &str =
    "UPDATE documents SET status = ?1, updated_at = ?2 WHERE id = ?3";
const DELETE_DOCUMENT_SQL: &str = "DELETE FROM documents WHERE id = ?1";

fn build_document_from_row(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: get_id(row, 0)?,
        lead_id: get_id(row, 1)?,
        category: parse_column(row, 2)?,
        file_name: row.get(3)?,
        content_type: row.get(4)?,
        size_bytes: row.get::<_, i64>(5)? as u64,
        is_submitted: row.get(6)?,
        status: parse_column(row, 7)?,
        uploaded_by: row.get(8)?,
        created_at: parse_timestamp(row, 9)?,
        updated_at: parse_timestamp(row, 10)?,
    })
}

/// Every document of a lead, including replaced and corrupted ones.
pub(crate) fn load_documents(conn: &Connection, lead_id: u64) -> Result<Vec<Document>> {
    let mut stmt = conn
        .prepare(SELECT_DOCUMENTS_BY_LEAD_SQL)
        .db_context("Failed to prepare query")?;

    let documents = stmt
        .query_map(params![lead_id as i64], build_document_from_row)
        .db_context("Failed to query documents")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch documents")?;

    Ok(documents)
}

fn load_document(conn: &Connection, id: u64) -> Result<Document> {
    conn.query_row(
        SELECT_DOCUMENT_BY_ID_SQL,
        params![id as i64],
        build_document_from_row,
    )
    .optional()
    .db_context("Failed to query document")?
    .ok_or(WorkflowError::DocumentNotFound { id })
}

fn ensure_open(actor: &Actor, lead: &Lead) -> Result<()> {
    if lead.status.is_closed() && !actor.role.is_admin() {
        return Err(Rejection::ProjectClosed {
            status: lead.status,
        }
        .into());
    }
    Ok(())
}

/// Moves the lead forward when a submitted, valid profile appears.
fn advance_on_profile(
    conn: &Connection,
    actor: &Actor,
    lead: &Lead,
    category: DocumentCategory,
    now: Timestamp,
) -> Result<()> {
    if category != DocumentCategory::Profile {
        return Ok(());
    }
    let Some(target) = engine::apply_lead_event(lead.status, LeadEvent::ProfileSubmitted) else {
        return Ok(());
    };

    update_lead_status(conn, lead, target, now)?;
    record_activity(
        conn,
        NewActivity {
            lead_id: lead.id,
            actor,
            action: ActivityAction::LeadStatusChanged,
            details: format!(
                "{} -> {} (profile submitted)",
                lead.status.as_str(),
                target.as_str()
            ),
            remarks: None,
        },
        &now.to_string(),
    )?;
    info!("Lead {} moved to {} by profile submission", lead.id, target.as_str());
    Ok(())
}

impl super::Database {
    /// Records an uploaded file. Any earlier valid document of the same
    /// category is marked replaced.
    pub fn upload_document(&mut self, actor: &Actor, params: &UploadDocument) -> Result<Document> {
        params.validate()?;

        let tx = self.immediate()?;
        let lead = load_lead(&tx, params.lead_id)?;
        ensure_open(actor, &lead)?;

        let now = Timestamp::now();
        let now_str = now.to_string();
        let replaced = tx
            .execute(
                REPLACE_VALID_DOCUMENTS_SQL,
                params![&now_str, lead.id as i64, params.category.as_str()],
            )
            .db_context("Failed to replace previous documents")?;

        let file_name = params.file_name.trim();
        tx.execute(
            INSERT_DOCUMENT_SQL,
            params![
                lead.id as i64,
                params.category.as_str(),
                file_name,
                params.content_type.as_deref(),
                params.size_bytes as i64,
                params.submit,
                DocumentStatus::Valid.as_str(),
                &actor.user,
                &now_str
            ],
        )
        .db_context("Failed to insert document")?;
        let id = tx.last_insert_rowid() as u64;

        let mut details = format!("{} uploaded as {file_name}", params.category.as_str());
        if replaced > 0 {
            details.push_str(" (replaces previous)");
        }
        record_activity(
            &tx,
            NewActivity {
                lead_id: lead.id,
                actor,
                action: ActivityAction::DocumentUploaded,
                details,
                remarks: None,
            },
            &now_str,
        )?;

        if params.submit {
            advance_on_profile(&tx, actor, &lead, params.category, now)?;
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Document {
            id,
            lead_id: lead.id,
            category: params.category,
            file_name: file_name.to_string(),
            content_type: params.content_type.clone(),
            size_bytes: params.size_bytes,
            is_submitted: params.submit,
            status: DocumentStatus::Valid,
            uploaded_by: actor.user.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Finalises a draft document. Submitting twice is a no-op.
    pub fn submit_document(&mut self, actor: &Actor, id: u64) -> Result<Document> {
        let tx = self.immediate()?;
        let document = load_document(&tx, id)?;
        let lead = load_lead(&tx, document.lead_id)?;
        ensure_open(actor, &lead)?;

        if document.status != DocumentStatus::Valid {
            return Err(WorkflowError::invalid_input(
                "id",
                format!(
                    "document {id} is {} and cannot be submitted",
                    document.status.as_str()
                ),
            ));
        }
        if document.is_submitted {
            return Ok(document);
        }

        let now = Timestamp::now();
        let now_str = now.to_string();
        tx.execute(SUBMIT_DOCUMENT_SQL, params![&now_str, id as i64])
            .db_context("Failed to submit document")?;
        record_activity(
            &tx,
            NewActivity {
                lead_id: lead.id,
                actor,
                action: ActivityAction::DocumentSubmitted,
                details: format!("{} submitted", document.category.as_str()),
                remarks: None,
            },
            &now_str,
        )?;
        advance_on_profile(&tx, actor, &lead, document.category, now)?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Document {
            is_submitted: true,
            updated_at: now,
            ..document
        })
    }

    /// Flags a document as unusable so it stops satisfying requirements.
    pub fn mark_document_corrupted(&mut self, actor: &Actor, id: u64) -> Result<Document> {
        if !actor.role.manages_leads() {
            return Err(Rejection::Permission {
                role: actor.role,
                action: "mark documents corrupted".to_string(),
            }
            .into());
        }

        let tx = self.immediate()?;
        let document = load_document(&tx, id)?;
        let now = Timestamp::now();
        let now_str = now.to_string();

        tx.execute(
            UPDATE_DOCUMENT_STATUS_SQL,
            params![DocumentStatus::Corrupted.as_str(), &now_str, id as i64],
        )
        .db_context("Failed to update document status")?;
        record_activity(
            &tx,
            NewActivity {
                lead_id: document.lead_id,
                actor,
                action: ActivityAction::DocumentCorrupted,
                details: format!(
                    "{} ({}) marked corrupted",
                    document.category.as_str(),
                    document.file_name
                ),
                remarks: None,
            },
            &now_str,
        )?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Document {
            status: DocumentStatus::Corrupted,
            updated_at: now,
            ..document
        })
    }

    /// Deletes a document. Allowed for its uploader and for lead managers.
    pub fn delete_document(&mut self, actor: &Actor, id: u64) -> Result<Document> {
        let tx = self.immediate()?;
        let document = load_document(&tx, id)?;
        if !actor.role.manages_leads() && document.uploaded_by != actor.user {
            return Err(Rejection::Permission {
                role: actor.role,
                action: format!("delete document {id}"),
            }
            .into());
        }
        let lead = load_lead(&tx, document.lead_id)?;
        ensure_open(actor, &lead)?;

        tx.execute(DELETE_DOCUMENT_SQL, params![id as i64])
            .db_context("Failed to delete document")?;
        record_activity(
            &tx,
            NewActivity {
                lead_id: lead.id,
                actor,
                action: ActivityAction::DocumentDeleted,
                details: format!(
                    "{} ({}) deleted",
                    document.category.as_str(),
                    document.file_name
                ),
                remarks: None,
            },
            &Timestamp::now().to_string(),
        )?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(document)
    }

    /// Every document of a lead, oldest first.
    pub fn list_documents(&self, lead_id: u64) -> Result<Vec<Document>> {
        load_lead(&self.connection, lead_id)?;
        load_documents(&self.connection, lead_id)
    }

    /// Fulfillment of a step's required documents for one lead.
    pub fn check_documents(&self, lead_id: u64, definition_id: u64) -> Result<FulfillmentReport> {
        load_lead(&self.connection, lead_id)?;
        let definition = load_definition(&self.connection, definition_id)?;
        let documents = load_documents(&self.connection, lead_id)?;
        Ok(FulfillmentReport::check(&definition, &documents))
    }
}
