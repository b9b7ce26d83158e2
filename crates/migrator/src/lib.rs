//! # pgmig: ordered, versioned PostgreSQL migrations
//!
//! Migrations are registered into an explicit [`Registry`], ordered by their
//! version string, and applied or reverted one transaction at a time by the
//! [`Migrator`]. The most recently applied version is persisted in a single
//! row of a dedicated table.
//!
//! ```rust,no_run
//! use pgmig::{Migrator, Registry};
//! # async fn example(pool: sqlx::PgPool, registry: Registry) -> pgmig::MigrationResult<()> {
//! let migrator = Migrator::new(registry)?;
//! migrator.run(&pool).await?;
//! println!("schema at {:?}", migrator.current_version(&pool).await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod migration;
pub mod migrator;
pub mod plan;
pub mod registry;
pub mod store;

pub use config::*;
pub use error::*;
pub use migration::*;
pub use migrator::*;
pub use plan::{Plan, Transition};
pub use registry::*;
pub use store::*;

pub use async_trait::async_trait;

/// Tracing target for migration events
pub const TRACING_TARGET_MIGRATION: &str = "pgmig::migrate";
