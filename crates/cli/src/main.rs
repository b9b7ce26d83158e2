mod commands;
mod logging;

use clap::{Parser, Subcommand};
use commands::migrate;
use logging::LoggingConfig;

#[derive(Parser)]
#[command(name = "pgmig")]
#[command(about = "Ordered, versioned PostgreSQL migrations")]
struct Cli {
    /// Database connection URL (defaults to $DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new migration file from a description
    New {
        /// Words describing the migration (e.g. add users table)
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Apply the next pending migration
    Up,

    /// Revert the most recently applied migration
    Down,

    /// Apply every pending migration in one transaction
    Run,

    /// Show applied and pending migrations
    Status,

    /// Print the current schema version
    Current,
}

impl Cli {
    fn database_url(&self) -> anyhow::Result<String> {
        match &self.database_url {
            Some(url) => Ok(url.clone()),
            None => std::env::var("DATABASE_URL").map_err(|_| {
                anyhow::anyhow!("no database configured: pass --database-url or set DATABASE_URL")
            }),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    logging::init_logging(logging.with_json(cli.json_logs))?;

    match &cli.command {
        Commands::New { words } => migrate::create(words)?,
        Commands::Up => migrate::up(&cli.database_url()?).await?,
        Commands::Down => migrate::down(&cli.database_url()?).await?,
        Commands::Run => migrate::run(&cli.database_url()?).await?,
        Commands::Status => migrate::status(&cli.database_url()?).await?,
        Commands::Current => migrate::current(&cli.database_url()?).await?,
    }

    Ok(())
}
