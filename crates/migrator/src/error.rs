//! Error types for the migration engine
//!
//! Every failure is returned to the caller. A failed migration body that also
//! fails to roll back is reported as a [`MigrationError::Joined`] value so
//! that neither failure is lost.

use std::fmt;

use crate::migration::MigrationDirection;

/// Boxed error returned by migration bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Error types for migration operations
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The persisted marker does not match any registered migration
    #[error("unresolved version: unknown version: {version}")]
    UnresolvedVersion { version: String },

    /// A migration declared a version that cannot be ordered safely
    #[error("invalid migration version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Two migrations declared the same version
    #[error("duplicate migration version: {version}")]
    DuplicateVersion { version: String },

    /// The forward or backward action of a migration failed
    #[error("migration {version} failed while running {direction}: {source}")]
    Migration {
        version: String,
        direction: MigrationDirection,
        #[source]
        source: BoxError,
    },

    /// The marker table could not be created
    #[error("failed to create migration table: {0}")]
    Bootstrap(#[source] sqlx::Error),

    /// Connection, transaction or statement failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid migrator configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A primary failure together with the failures raised while cleaning up
    #[error("{}", JoinedDisplay(.0))]
    Joined(Vec<MigrationError>),
}

impl MigrationError {
    /// Combine a primary failure with an optional rollback failure.
    ///
    /// Returns the primary error untouched when the rollback succeeded.
    pub fn join(primary: MigrationError, rollback: Option<sqlx::Error>) -> MigrationError {
        match rollback {
            None => primary,
            Some(err) => {
                let mut errors = match primary {
                    MigrationError::Joined(errors) => errors,
                    other => vec![other],
                };
                errors.push(MigrationError::Database(err));
                MigrationError::Joined(errors)
            }
        }
    }

    /// All causes carried by this error, primary first
    pub fn errors(&self) -> Vec<&MigrationError> {
        match self {
            MigrationError::Joined(errors) => errors.iter().flat_map(|e| e.errors()).collect(),
            other => vec![other],
        }
    }

    /// Whether this error, or any error joined into it, is an unresolved version
    pub fn is_unresolved_version(&self) -> bool {
        self.errors()
            .iter()
            .any(|e| matches!(e, MigrationError::UnresolvedVersion { .. }))
    }

    /// Whether a migration body failure is among the causes
    pub fn is_migration_failure(&self) -> bool {
        self.errors()
            .iter()
            .any(|e| matches!(e, MigrationError::Migration { .. }))
    }
}

struct JoinedDisplay<'a>(&'a [MigrationError]);

impl fmt::Display for JoinedDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_failure() -> MigrationError {
        MigrationError::Migration {
            version: "20240102000000000".to_string(),
            direction: MigrationDirection::Up,
            source: "relation \"mig02\" already exists".into(),
        }
    }

    #[test]
    fn test_join_without_rollback_failure_keeps_primary() {
        let err = MigrationError::join(body_failure(), None);
        assert!(matches!(err, MigrationError::Migration { .. }));
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn test_join_keeps_both_failures() {
        let err = MigrationError::join(body_failure(), Some(sqlx::Error::PoolClosed));

        let causes = err.errors();
        assert_eq!(causes.len(), 2);
        assert!(matches!(causes[0], MigrationError::Migration { .. }));
        assert!(matches!(causes[1], MigrationError::Database(sqlx::Error::PoolClosed)));

        let message = err.to_string();
        assert!(message.contains("migration 20240102000000000 failed while running up"));
        assert!(message.contains("database error"));
        assert_eq!(message.lines().count(), 2);
        assert!(err.is_migration_failure());
        assert!(!err.is_unresolved_version());
    }

    #[test]
    fn test_unresolved_version_is_detected_through_join() {
        let unresolved = MigrationError::UnresolvedVersion {
            version: "19990101000000000".to_string(),
        };
        assert!(unresolved.is_unresolved_version());
        assert_eq!(
            unresolved.to_string(),
            "unresolved version: unknown version: 19990101000000000"
        );

        let joined = MigrationError::join(unresolved, Some(sqlx::Error::PoolTimedOut));
        assert!(joined.is_unresolved_version());
    }
}
