use clap::{Parser, Subcommand};
use engine::{Engine, ErrorLogRecorder};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "masterdetail")]
#[command(about = "Operator utilities for the master-detail document store")]
struct Cli {
    /// Settings file (TOML), without extension.
    #[arg(long, default_value = "settings")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations (default).
    Migrate,
    /// Print every document with its details as JSON.
    List,
    /// Print one document with its details as JSON.
    Show { id: i64 },
    /// Print the most recent error log entries.
    Errors {
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "masterdetail={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let error_log = match &settings.error_log_database {
        Some(config) => {
            tracing::info!("Using a dedicated error log database...");
            ErrorLogRecorder::new(parse_database(config).await?)
        }
        None => ErrorLogRecorder::new(db.clone()),
    };

    let engine = Engine::builder()
        .database(db)
        .error_log(error_log)
        .build()
        .await?;

    match cli.command.unwrap_or(Command::Migrate) {
        Command::Migrate => tracing::info!("database is up to date"),
        Command::List => {
            let documents = engine.documents().await?;
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        Command::Show { id } => {
            let document = engine.document_with_details(id).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Errors { limit } => {
            for entry in engine.error_log().entries(limit).await? {
                println!(
                    "{} [{}] {}: {}",
                    entry.recorded_at.to_rfc3339(),
                    entry.category.as_str(),
                    entry.category.description(),
                    entry.message
                );
            }
        }
    }

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
