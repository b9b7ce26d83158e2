//! Migrator configuration

use std::env;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MigrationError, MigrationResult};

/// Default name of the table holding the current-version marker
pub const DEFAULT_MIGRATION_TABLE: &str = "_pgMigrationTable";

/// Environment variable overriding the marker table name
pub const MIGRATION_TABLE_ENV: &str = "PGMIG_TABLE";

static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("identifier pattern is valid")
});

/// Configuration for the migration engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    /// Table name for tracking the current version
    pub table_name: String,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_MIGRATION_TABLE.to_string(),
        }
    }
}

impl MigratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> MigrationResult<Self> {
        let config = match env::var(MIGRATION_TABLE_ENV) {
            Ok(table_name) => Self { table_name },
            Err(env::VarError::NotPresent) => Self::default(),
            Err(err) => {
                return Err(MigrationError::Configuration(format!(
                    "{} is not valid unicode: {}",
                    MIGRATION_TABLE_ENV, err
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the marker table name
    pub fn with_table_name<S: Into<String>>(mut self, table_name: S) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Validate the configuration.
    ///
    /// The table name is interpolated into SQL, so only plain identifiers are
    /// accepted.
    pub fn validate(&self) -> MigrationResult<()> {
        if !IDENTIFIER_PATTERN.is_match(&self.table_name) {
            return Err(MigrationError::Configuration(format!(
                "invalid migration table name '{}': expected a plain SQL identifier",
                self.table_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_name() {
        let config = MigratorConfig::default();
        assert_eq!(config.table_name, "_pgMigrationTable");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_table_name() {
        let config = MigratorConfig::new().with_table_name("schema_version");
        assert_eq!(config.table_name, "schema_version");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_injected_table_name() {
        for name in ["", "1table", "users; DROP TABLE users", "public.versions", "a b"] {
            let config = MigratorConfig::new().with_table_name(name);
            assert!(
                matches!(config.validate(), Err(MigrationError::Configuration(_))),
                "{} should be rejected",
                name
            );
        }
    }
}
