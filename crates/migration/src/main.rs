use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./masterdetail.db?mode=rwc";
const USAGE: &str = "Usage: cargo run -p migration -- [up|down|fresh|status]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    if !matches!(command.as_str(), "up" | "down" | "fresh" | "status") {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match command.as_str() {
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        _ => migration::Migrator::up(&db, None).await?,
    }

    Ok(())
}
