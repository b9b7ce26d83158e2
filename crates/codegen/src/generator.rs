use crate::config::ScaffoldConfig;
use crate::error::{CodegenError, CodegenResult};
use crate::templates::{render_template, MIGRATION_TEMPLATE};
use crate::writer::CodeWriter;
use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::info;

static NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("identifier pattern is valid"));

/// Fixed-width version derived from a point in time: `YYYYMMDDHHMMSSmmm`
pub fn migration_timestamp<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%Y%m%d%H%M%S%3f").to_string()
}

/// Lowercased, underscore-joined description usable in file and module names
pub fn slugify<S: AsRef<str>>(words: &[S]) -> String {
    let joined = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();

    NON_IDENT
        .replace_all(&joined, "_")
        .trim_matches('_')
        .to_string()
}

fn struct_name(slug: &str) -> String {
    let name: String = slug
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Migration{}", name)
    } else {
        name
    }
}

/// Names derived for one new migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationName {
    pub version: String,
    pub slug: String,
    pub file_name: String,
    pub module_name: String,
    pub struct_name: String,
}

impl MigrationName {
    pub fn new<S, Tz>(words: &[S], now: &DateTime<Tz>) -> CodegenResult<Self>
    where
        S: AsRef<str>,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let slug = slugify(words);
        if slug.is_empty() {
            return Err(CodegenError::Validation(
                "a migration description is required".to_string(),
            ));
        }

        let version = migration_timestamp(now);
        Ok(Self {
            file_name: format!("{}_{}.rs", version, slug),
            module_name: format!("m{}_{}", version, slug),
            struct_name: struct_name(&slug),
            version,
            slug,
        })
    }

    /// Lines that register the generated file in the migrations crate
    pub fn registration_snippet(&self) -> String {
        format!(
            "#[path = \"{file}\"]\nmod {module};\n\nregistry.register({module}::{ty})?;",
            file = self.file_name,
            module = self.module_name,
            ty = self.struct_name,
        )
    }
}

/// A migration file written to disk
#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    pub path: PathBuf,
    pub name: MigrationName,
}

pub struct MigrationGenerator {
    project_root: PathBuf,
    config: ScaffoldConfig,
    writer: CodeWriter,
}

impl MigrationGenerator {
    pub fn new(project_root: impl Into<PathBuf>, config: ScaffoldConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
            writer: CodeWriter::new(),
        }
    }

    /// Directory receiving generated files
    pub fn output_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.path)
    }

    pub fn render(&self, name: &MigrationName) -> CodegenResult<String> {
        let mut context = HashMap::new();
        context.insert("crate", self.config.crate_name.clone());
        context.insert("struct_name", name.struct_name.clone());
        context.insert("version", name.version.clone());
        context.insert("name", name.slug.clone());

        render_template(MIGRATION_TEMPLATE, &context)
    }

    /// Write a skeleton migration described by `words`, stamped with `now`
    pub fn generate<S, Tz>(&self, words: &[S], now: &DateTime<Tz>) -> CodegenResult<GeneratedMigration>
    where
        S: AsRef<str>,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let name = MigrationName::new(words, now)?;
        let content = self.render(&name)?;
        let path = self.output_dir().join(&name.file_name);

        info!(path = %path.display(), version = %name.version, "Creating new migration file");
        self.writer.write_new(&path, &content)?;

        Ok(GeneratedMigration { path, name })
    }
}
