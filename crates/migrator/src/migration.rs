//! Migration Definitions - the unit contract and version identity
//!
//! A migration is an opaque pair of forward and backward actions identified by
//! a version string. Versions order lexicographically, so by convention they
//! are fixed-width numeric timestamps (`YYYYMMDDHHMMSSmmm`).

use std::borrow::Borrow;
use std::fmt;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgConnection;

use crate::error::{BoxError, MigrationError, MigrationResult};

/// Maximum width of a version, bounded by the marker column
pub const MAX_VERSION_LEN: usize = 30;

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("version pattern is valid"));

/// A database migration.
///
/// `up` and `down` receive the connection of the transaction opened by the
/// [`Migrator`](crate::Migrator); they must not commit or roll back
/// themselves. The two actions are expected to be inverses of each other.
///
/// ```rust,no_run
/// use pgmig::{async_trait, BoxError, Migration};
/// use sqlx::PgConnection;
///
/// pub struct CreateUsers;
///
/// #[async_trait]
/// impl Migration for CreateUsers {
///     fn version(&self) -> &str {
///         "20240325173102513"
///     }
///
///     async fn up(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
///         sqlx::query("CREATE TABLE users (id BIGSERIAL PRIMARY KEY)")
///             .execute(&mut *conn)
///             .await?;
///         Ok(())
///     }
///
///     async fn down(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
///         sqlx::query("DROP TABLE users").execute(&mut *conn).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Migration: Send + Sync {
    /// Unique, lexicographically sortable identity of this migration
    fn version(&self) -> &str;

    /// Human-readable description
    fn name(&self) -> &str {
        ""
    }

    /// Apply the schema change
    async fn up(&self, conn: &mut PgConnection) -> Result<(), BoxError>;

    /// Revert the schema change
    async fn down(&self, conn: &mut PgConnection) -> Result<(), BoxError>;
}

/// Migration direction for execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationDirection {
    /// Apply migrations (run forward actions)
    Up,
    /// Revert migrations (run backward actions)
    Down,
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationDirection::Up => write!(f, "up"),
            MigrationDirection::Down => write!(f, "down"),
        }
    }
}

/// Validated migration version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(String);

impl Version {
    /// Parse a version, rejecting anything that would not sort chronologically
    pub fn parse(version: &str) -> MigrationResult<Self> {
        let invalid = |reason: &str| MigrationError::InvalidVersion {
            version: version.to_string(),
            reason: reason.to_string(),
        };

        if version.is_empty() {
            return Err(invalid("version cannot be empty"));
        }
        if version.len() > MAX_VERSION_LEN {
            return Err(invalid(&format!(
                "version is longer than {} characters",
                MAX_VERSION_LEN
            )));
        }
        if !VERSION_PATTERN.is_match(version) {
            return Err(invalid("version must contain only ASCII digits"));
        }

        Ok(Self(version.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Version {
    fn borrow(&self) -> &str {
        &self.0
    }
}
