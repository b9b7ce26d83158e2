//! Migrator - executes transitions against the database
//!
//! Every transition reads the marker once, plans against the registry, and
//! executes the planned migrations together with the marker update inside a
//! single transaction. The transaction either commits once or rolls back once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, info, warn};

use crate::config::MigratorConfig;
use crate::error::{MigrationError, MigrationResult};
use crate::migration::{Migration, MigrationDirection};
use crate::plan::{plan, resolve, Plan, Transition};
use crate::registry::Registry;
use crate::store::VersionStore;
use crate::TRACING_TARGET_MIGRATION;

/// Result of a single transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Direction of the executed migrations
    pub direction: MigrationDirection,
    /// Marker before the transition
    pub from: Option<String>,
    /// Marker after the transition
    pub to: Option<String>,
    /// Versions whose actions were executed, in execution order
    pub versions: Vec<String>,
    /// Total execution time
    pub duration: Duration,
}

impl MigrationOutcome {
    /// Whether nothing was executed
    pub fn is_noop(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Applied and pending migrations relative to the current marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Current marker
    pub current: Option<String>,
    /// Versions at or before the marker, ascending
    pub applied: Vec<String>,
    /// Versions after the marker, ascending
    pub pending: Vec<String>,
}

impl MigrationStatus {
    /// Returns true if all migrations have been applied
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Migration engine
#[derive(Debug, Clone)]
pub struct Migrator {
    registry: Registry,
    store: VersionStore,
}

impl Migrator {
    /// Create a migrator using the default marker table
    pub fn new(registry: Registry) -> MigrationResult<Self> {
        Self::with_config(registry, MigratorConfig::default())
    }

    /// Create a migrator with a custom configuration
    pub fn with_config(registry: Registry, config: MigratorConfig) -> MigrationResult<Self> {
        let store = VersionStore::new(&config)?;
        Ok(Self { registry, store })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// Registered migrations in ascending version order
    pub fn list_registered(&self) -> Vec<Arc<dyn Migration>> {
        self.registry.migrations()
    }

    /// Current marker, `None` when nothing is applied
    pub async fn current_version(&self, pool: &PgPool) -> MigrationResult<Option<String>> {
        self.store.current_version(pool).await
    }

    /// Apply the next pending migration
    #[tracing::instrument(skip_all, target = TRACING_TARGET_MIGRATION)]
    pub async fn up(&self, pool: &PgPool) -> MigrationResult<MigrationOutcome> {
        self.transition(pool, Transition::Up).await
    }

    /// Revert the current migration
    #[tracing::instrument(skip_all, target = TRACING_TARGET_MIGRATION)]
    pub async fn down(&self, pool: &PgPool) -> MigrationResult<MigrationOutcome> {
        self.transition(pool, Transition::Down).await
    }

    /// Apply every pending migration in one transaction
    #[tracing::instrument(skip_all, target = TRACING_TARGET_MIGRATION)]
    pub async fn run(&self, pool: &PgPool) -> MigrationResult<MigrationOutcome> {
        self.transition(pool, Transition::Run).await
    }

    /// Applied and pending migrations
    pub async fn status(&self, pool: &PgPool) -> MigrationResult<MigrationStatus> {
        let current = self.current_version(pool).await?;
        let versions: Vec<String> = self
            .registry
            .ordered_versions()
            .into_iter()
            .map(|v| v.to_string())
            .collect();

        let split = if versions.is_empty() {
            0
        } else {
            resolve(&versions, current.as_deref())?.map_or(0, |i| i + 1)
        };
        let pending = versions[split..].to_vec();
        let mut applied = versions;
        applied.truncate(split);

        Ok(MigrationStatus {
            current,
            applied,
            pending,
        })
    }

    async fn transition(
        &self,
        pool: &PgPool,
        transition: Transition,
    ) -> MigrationResult<MigrationOutcome> {
        let start_time = Instant::now();

        if self.registry.is_empty() {
            debug!(
                target: TRACING_TARGET_MIGRATION,
                ?transition,
                "No migrations registered, nothing to do"
            );
            return Ok(MigrationOutcome {
                direction: transition.direction(),
                from: None,
                to: None,
                versions: Vec::new(),
                duration: start_time.elapsed(),
            });
        }

        let current = self.current_version(pool).await?;
        let versions = self.registry.ordered_versions();
        let plan = plan(transition, &versions, current.as_deref()).map_err(|err| {
            error!(
                target: TRACING_TARGET_MIGRATION,
                ?transition,
                version = current.as_deref().unwrap_or(""),
                "Current version does not match any registered migration"
            );
            err
        })?;

        if plan.is_noop() {
            info!(
                target: TRACING_TARGET_MIGRATION,
                ?transition,
                version = current.as_deref().unwrap_or(""),
                "Database schema is already at the requested version"
            );
            return Ok(MigrationOutcome {
                direction: plan.direction,
                from: current.clone(),
                to: current,
                versions: Vec::new(),
                duration: start_time.elapsed(),
            });
        }

        info!(
            target: TRACING_TARGET_MIGRATION,
            ?transition,
            from = current.as_deref().unwrap_or(""),
            to = plan.target.as_deref().unwrap_or(""),
            count = plan.steps.len(),
            "Starting migration transition"
        );

        let mut tx = pool.begin().await?;

        let executed = match self.execute(&mut tx, &plan).await {
            Ok(executed) => executed,
            Err(err) => {
                let rollback = tx.rollback().await.err();
                if let Some(rollback_err) = &rollback {
                    warn!(
                        target: TRACING_TARGET_MIGRATION,
                        error = %rollback_err,
                        "Rollback after failed migration also failed"
                    );
                }
                let err = MigrationError::join(err, rollback);
                error!(
                    target: TRACING_TARGET_MIGRATION,
                    ?transition,
                    error = %err,
                    "Migration transition failed, changes rolled back"
                );
                return Err(err);
            }
        };

        tx.commit().await?;

        let duration = start_time.elapsed();
        info!(
            target: TRACING_TARGET_MIGRATION,
            ?transition,
            version = plan.target.as_deref().unwrap_or(""),
            count = executed.len(),
            duration = ?duration,
            "Migration transition committed"
        );

        Ok(MigrationOutcome {
            direction: plan.direction,
            from: current,
            to: plan.target,
            versions: executed,
            duration,
        })
    }

    /// Run the planned actions and record the new marker
    async fn execute(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        plan: &Plan,
    ) -> MigrationResult<Vec<String>> {
        let migrations = self.registry.migrations();
        let mut executed = Vec::with_capacity(plan.steps.len());

        for &index in &plan.steps {
            let migration = &migrations[index];
            let version = migration.version().to_string();

            debug!(
                target: TRACING_TARGET_MIGRATION,
                version = %version,
                name = migration.name(),
                direction = %plan.direction,
                "Executing migration"
            );

            let result = match plan.direction {
                MigrationDirection::Up => migration.up(&mut **tx).await,
                MigrationDirection::Down => migration.down(&mut **tx).await,
            };
            result.map_err(|source| MigrationError::Migration {
                version: version.clone(),
                direction: plan.direction,
                source,
            })?;

            executed.push(version);
        }

        self.store
            .set_version(&mut **tx, plan.target.as_deref())
            .await?;

        Ok(executed)
    }
}
