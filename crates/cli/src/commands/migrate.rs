use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Local};
use pgmig::{MigrationOutcome, Migrator, MigratorConfig};
use pgmig_codegen::{GeneratedMigration, MigrationGenerator, ScaffoldConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use url::Url;

pub fn create(words: &[String]) -> anyhow::Result<()> {
    let root = std::env::current_dir().context("failed to read the working directory")?;
    let generated = create_in(&root, words, &Local::now())?;

    println!("Created migration: {}", generated.path.display());
    println!();
    println!("Register it with the migrations crate:");
    println!();
    for line in generated.name.registration_snippet().lines() {
        println!("    {}", line);
    }
    Ok(())
}

pub async fn up(database_url: &str) -> anyhow::Result<()> {
    let (pool, migrator) = connect(database_url).await?;
    let outcome = migrator.up(&pool).await?;
    report(&outcome);
    Ok(())
}

pub async fn down(database_url: &str) -> anyhow::Result<()> {
    let (pool, migrator) = connect(database_url).await?;
    let outcome = migrator.down(&pool).await?;
    report(&outcome);
    Ok(())
}

pub async fn run(database_url: &str) -> anyhow::Result<()> {
    let (pool, migrator) = connect(database_url).await?;
    let outcome = migrator.run(&pool).await?;
    report(&outcome);
    Ok(())
}

pub async fn status(database_url: &str) -> anyhow::Result<()> {
    let (pool, migrator) = connect(database_url).await?;
    let status = migrator.status(&pool).await?;

    println!("Migration Status:");
    println!("================");

    if status.applied.is_empty() && status.pending.is_empty() {
        println!("No migrations registered");
        return Ok(());
    }

    for migration in migrator.list_registered() {
        let mark = if status.applied.iter().any(|v| v == migration.version()) {
            "applied"
        } else {
            "pending"
        };
        let current = if status.current.as_deref() == Some(migration.version()) {
            "  <- current"
        } else {
            ""
        };
        println!("  [{}] {} {}{}", mark, migration.version(), migration.name(), current);
    }

    println!();
    println!(
        "{} applied, {} pending",
        status.applied.len(),
        status.pending.len()
    );
    Ok(())
}

pub async fn current(database_url: &str) -> anyhow::Result<()> {
    let (pool, migrator) = connect(database_url).await?;
    match migrator.current_version(&pool).await? {
        Some(version) => println!("{}", version),
        None => println!("(none)"),
    }
    Ok(())
}

/// Scaffold a migration under `root`, honoring its `migration.yaml`
fn create_in(
    root: &Path,
    words: &[String],
    now: &DateTime<Local>,
) -> anyhow::Result<GeneratedMigration> {
    let config = ScaffoldConfig::load(root)?;
    let generator = MigrationGenerator::new(root, config);
    Ok(generator.generate(words, now)?)
}

async fn connect(database_url: &str) -> anyhow::Result<(PgPool, Migrator)> {
    let registry = pgmig_migrations::registry()?;
    let migrator = Migrator::with_config(registry, MigratorConfig::from_env()?)?;

    info!(database = %mask_database_url(database_url), "Connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .with_context(|| format!("failed to connect to {}", mask_database_url(database_url)))?;

    Ok((pool, migrator))
}

fn report(outcome: &MigrationOutcome) {
    if outcome.is_noop() {
        println!(
            "Nothing to migrate {} (current: {})",
            outcome.direction,
            outcome.from.as_deref().unwrap_or("none")
        );
        return;
    }

    for version in &outcome.versions {
        println!("  {} {}", outcome.direction, version);
    }
    println!(
        "Migrated {} -> {} in {:.2?}",
        outcome.from.as_deref().unwrap_or("none"),
        outcome.to.as_deref().unwrap_or("none"),
        outcome.duration
    );
}

fn mask_database_url(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("****")).is_err() {
                return "<database url>".to_string();
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}
