//! Handles settings for the application. Configuration is read from
//! `settings.toml` (or the file passed with `--config`) and from
//! `MASTERDETAIL__*` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    /// Dedicated store for the error log. Defaults to `database`.
    pub error_log_database: Option<Database>,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("database", "memory")?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("MASTERDETAIL").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
