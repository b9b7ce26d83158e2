//! Scaffold configuration
//!
//! Read from `migration.yaml` in the working directory, falling back to the
//! bundled defaults when the file is missing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{CodegenError, CodegenResult};

/// Name of the project-level configuration file
pub const CONFIG_FILE: &str = "migration.yaml";

/// Bundled default configuration
pub const DEFAULT_CONFIG: &str = include_str!("../config.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScaffoldConfig {
    /// Directory that receives generated migration files
    pub path: PathBuf,
    /// Crate providing the `Migration` trait, as written in `use` paths
    #[serde(rename = "crate")]
    pub crate_name: String,
}

impl ScaffoldConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> CodegenResult<Self> {
        let config: ScaffoldConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `migration.yaml` from `dir`, or the bundled defaults if absent
    pub fn load(dir: &Path) -> CodegenResult<Self> {
        let path = dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "Loaded scaffold configuration");
                Self::from_yaml(&content)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No {} found, using bundled defaults", CONFIG_FILE);
                Self::from_yaml(DEFAULT_CONFIG)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn validate(&self) -> CodegenResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(CodegenError::Validation("'path' is required".to_string()));
        }
        if self.crate_name.trim().is_empty() {
            return Err(CodegenError::Validation("'crate' is required".to_string()));
        }
        Ok(())
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("migrations"),
            crate_name: "pgmig".to_string(),
        }
    }
}
