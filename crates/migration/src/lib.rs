pub use sea_orm_migration::prelude::*;

mod m20261001_000001_documents;
mod m20261001_000002_error_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_documents::Migration),
            Box::new(m20261001_000002_error_log::Migration),
        ]
    }
}
