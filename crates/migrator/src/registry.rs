//! Migration Registry - ordered collection of migration units
//!
//! The registry keeps its units in a single ordered map keyed by version, so
//! the ascending sequence and the version lookup cannot drift apart.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{MigrationError, MigrationResult};
use crate::migration::{Migration, Version};
use crate::TRACING_TARGET_MIGRATION;

/// Registry of every migration known to the application
#[derive(Default, Clone)]
pub struct Registry {
    migrations: BTreeMap<Version, Arc<dyn Migration>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migration unit.
    ///
    /// The version must be a digit string of the same width as every version
    /// registered before it, and must not be registered yet.
    pub fn register<M>(&mut self, migration: M) -> MigrationResult<()>
    where
        M: Migration + 'static,
    {
        self.register_arc(Arc::new(migration))
    }

    /// Register a shared migration unit
    pub fn register_arc(&mut self, migration: Arc<dyn Migration>) -> MigrationResult<()> {
        let version = Version::parse(migration.version())?;

        if let Some(existing) = self.migrations.keys().next() {
            if existing.as_str().len() != version.as_str().len() {
                return Err(MigrationError::InvalidVersion {
                    version: version.to_string(),
                    reason: format!(
                        "expected a {}-character version like '{}'",
                        existing.as_str().len(),
                        existing
                    ),
                });
            }
        }

        if self.migrations.contains_key(&version) {
            return Err(MigrationError::DuplicateVersion {
                version: version.to_string(),
            });
        }

        debug!(
            target: TRACING_TARGET_MIGRATION,
            version = %version,
            name = migration.name(),
            "Registered migration"
        );
        self.migrations.insert(version, migration);
        Ok(())
    }

    /// Register a migration unit, aborting on a mis-registered unit.
    ///
    /// # Panics
    ///
    /// Panics when [`Registry::register`] would fail. A bad version is a
    /// programming error in the migration set, not a runtime condition.
    pub fn must_register<M>(&mut self, migration: M)
    where
        M: Migration + 'static,
    {
        if let Err(err) = self.register(migration) {
            panic!("failed to register migration: {}", err);
        }
    }

    /// Ascending sequence of registered versions
    pub fn ordered_versions(&self) -> Vec<&Version> {
        self.migrations.keys().collect()
    }

    /// Migration registered under `version`
    pub fn get(&self, version: &str) -> Option<&Arc<dyn Migration>> {
        self.migrations.get(version)
    }

    /// Ordered position of `version`
    pub fn position(&self, version: &str) -> Option<usize> {
        self.migrations.keys().position(|v| v.as_str() == version)
    }

    /// Registered migrations in ascending version order
    pub fn migrations(&self) -> Vec<Arc<dyn Migration>> {
        self.migrations.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("versions", &self.ordered_versions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use async_trait::async_trait;
    use sqlx::PgConnection;

    struct Noop(&'static str);

    #[async_trait]
    impl Migration for Noop {
        fn version(&self) -> &str {
            self.0
        }

        async fn up(&self, _conn: &mut PgConnection) -> Result<(), BoxError> {
            Ok(())
        }

        async fn down(&self, _conn: &mut PgConnection) -> Result<(), BoxError> {
            Ok(())
        }
    }

    fn versions(registry: &Registry) -> Vec<&str> {
        registry
            .ordered_versions()
            .into_iter()
            .map(|v| v.as_str())
            .collect()
    }

    #[test]
    fn test_register_keeps_ascending_order() {
        let mut registry = Registry::new();
        registry.register(Noop("20240325174354720")).unwrap();
        registry.register(Noop("20240325173102513")).unwrap();
        registry.register(Noop("20240325174351002")).unwrap();

        assert_eq!(
            versions(&registry),
            vec!["20240325173102513", "20240325174351002", "20240325174354720"]
        );
        assert_eq!(registry.len(), 3);

        let listed: Vec<String> = registry
            .migrations()
            .iter()
            .map(|m| m.version().to_string())
            .collect();
        assert_eq!(listed, versions(&registry));
    }

    #[test]
    fn test_lookup_and_position() {
        let mut registry = Registry::new();
        registry.register(Noop("20240102000000000")).unwrap();
        registry.register(Noop("20240101000000000")).unwrap();

        assert_eq!(registry.position("20240101000000000"), Some(0));
        assert_eq!(registry.position("20240102000000000"), Some(1));
        assert_eq!(registry.position("20240103000000000"), None);

        assert!(registry.get("20240102000000000").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = Registry::new();
        registry.register(Noop("20240101000000000")).unwrap();

        let err = registry.register(Noop("20240101000000000")).unwrap_err();
        assert!(matches!(err, MigrationError::DuplicateVersion { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_mixed_widths() {
        let mut registry = Registry::new();
        registry.register(Noop("20240101000000000")).unwrap();

        let err = registry.register(Noop("202401020000")).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidVersion { .. }));
    }

    #[test]
    fn test_register_rejects_invalid_version() {
        let mut registry = Registry::new();
        let err = registry.register(Noop("add_users")).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidVersion { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    #[should_panic(expected = "failed to register migration")]
    fn test_must_register_panics_on_bad_version() {
        let mut registry = Registry::new();
        registry.must_register(Noop(""));
    }
}
