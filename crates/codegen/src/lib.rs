//! Scaffolding for new migration files.
//!
//! A migration is generated from a free-text description: the current time
//! becomes its version and file-name prefix, the description becomes its slug,
//! and the file contains a skeleton implementing `pgmig::Migration`.

pub mod config;
pub mod error;
pub mod generator;
pub mod templates;
pub mod writer;

pub use config::*;
pub use error::*;
pub use generator::*;
pub use writer::*;
