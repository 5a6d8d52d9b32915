use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ErrorLog {
    Table,
    Id,
    RecordedAt,
    Category,
    Message,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ErrorLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ErrorLog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ErrorLog::RecordedAt).timestamp().not_null())
                    .col(ColumnDef::new(ErrorLog::Category).string().not_null())
                    .col(ColumnDef::new(ErrorLog::Message).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-error_log-recorded_at")
                    .table(ErrorLog::Table)
                    .col(ErrorLog::RecordedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ErrorLog::Table).to_owned())
            .await
    }
}
