//! Database schema initialization and migrations.

use log::info;

use crate::error::{DatabaseResultExt, Result};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Foreign keys are per connection in SQLite
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        self.connection
            .busy_timeout(std::time::Duration::from_secs(5))
            .db_context("Failed to set busy timeout")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Brings databases created before optimistic locking up to date.
    fn apply_migrations(&self) -> Result<()> {
        for table in ["leads", "step_instances"] {
            if !self.has_column(table, "version")? {
                info!("Adding version column to {table}");
                self.connection
                    .execute(
                        &format!(
                            "ALTER TABLE {table} ADD COLUMN version INTEGER NOT NULL DEFAULT 0"
                        ),
                        [],
                    )
                    .db_context("Failed to add version column")?;
            }
        }

        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let count: i64 = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
                rusqlite::params![table, column],
                |row| row.get(0),
            )
            .db_context("Failed to inspect table columns")?;
        Ok(count > 0)
    }
}
