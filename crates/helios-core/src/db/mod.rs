//! Database operations and SQLite management for the lead timeline.
//!
//! Every state change runs inside an immediate transaction: the rows are
//! re-read, the pure rules in [`crate::workflow`] decide the outcome, and the
//! write is conditioned on the `version` the rules saw. Two writers racing on
//! the same step therefore never both succeed.

use std::path::Path;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{DatabaseResultExt, Result};

pub mod activity_queries;
pub mod definition_queries;
pub mod document_queries;
pub mod lead_queries;
pub mod migrations;
pub mod step_queries;
pub(crate) mod utils;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Starts a write transaction that takes the database lock up front.
    fn immediate(&mut self) -> Result<Transaction<'_>> {
        self.connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")
    }
}
