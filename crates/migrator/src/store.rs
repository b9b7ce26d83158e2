//! Version Store - persisted current-version marker
//!
//! The marker is a single row `(id = 1, version)` in a dedicated table that is
//! created on first access. An absent row, or a row holding the empty string,
//! means that no migration has been applied.

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use tracing::debug;

use crate::config::MigratorConfig;
use crate::error::{MigrationError, MigrationResult};
use crate::TRACING_TARGET_MIGRATION;

/// Reads and writes the current-version marker
#[derive(Debug, Clone)]
pub struct VersionStore {
    table_name: String,
}

impl VersionStore {
    /// Create a store for the table named in `config`
    pub fn new(config: &MigratorConfig) -> MigrationResult<Self> {
        config.validate()?;
        Ok(Self {
            table_name: config.table_name.clone(),
        })
    }

    /// Name of the marker table
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the marker table if it does not exist yet
    pub async fn ensure_table<'e, E>(&self, executor: E) -> MigrationResult<()>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = self.create_table_sql();
        sqlx::query(&sql)
            .execute(executor)
            .await
            .map_err(MigrationError::Bootstrap)?;
        Ok(())
    }

    /// Read the current marker, bootstrapping the table on first access.
    ///
    /// Returns `None` when no migration has been applied.
    pub async fn current_version(&self, pool: &PgPool) -> MigrationResult<Option<String>> {
        self.ensure_table(pool).await?;

        let version: Option<String> = sqlx::query_scalar(&self.select_version_sql())
            .fetch_optional(pool)
            .await?;

        let version = version.filter(|v| !v.is_empty());
        debug!(
            target: TRACING_TARGET_MIGRATION,
            version = version.as_deref().unwrap_or(""),
            "Read current migration version"
        );
        Ok(version)
    }

    /// Upsert the marker inside the caller's transaction.
    ///
    /// `None` records that no migration is applied.
    pub async fn set_version(
        &self,
        conn: &mut PgConnection,
        version: Option<&str>,
    ) -> MigrationResult<()> {
        sqlx::query(&self.upsert_version_sql())
            .bind(version.unwrap_or(""))
            .execute(&mut *conn)
            .await?;

        debug!(
            target: TRACING_TARGET_MIGRATION,
            version = version.unwrap_or(""),
            "Recorded migration version"
        );
        Ok(())
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    \
                id int NOT NULL,\n    \
                version varchar(30) NOT NULL,\n    \
                PRIMARY KEY (id)\n\
            )",
            self.table_name
        )
    }

    fn select_version_sql(&self) -> String {
        format!("SELECT version FROM {} WHERE id = 1", self.table_name)
    }

    fn upsert_version_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, version) VALUES (1, $1) \
             ON CONFLICT (id) DO UPDATE SET version = EXCLUDED.version",
            self.table_name
        )
    }
}
