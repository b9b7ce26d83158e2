use crate::error::{CodegenError, CodegenResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

pub struct CodeWriter;

impl CodeWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `content` to a file that must not exist yet, creating parent
    /// directories as needed
    pub fn write_new(&self, path: &Path, content: &str) -> CodegenResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => CodegenError::AlreadyExists(path.display().to_string()),
                _ => CodegenError::Io(e),
            })?;

        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
