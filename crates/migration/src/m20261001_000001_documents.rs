//! Document schema.
//!
//! - `documents`: master records, unique by `doc_number`, carrying the derived
//!   `total_sum_minor`
//! - `document_details`: line items owned by a document; removed together with
//!   their parent

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    DocNumber,
    DocDate,
    TotalSumMinor,
    Notes,
}

#[derive(Iden)]
enum DocumentDetails {
    Table,
    Id,
    DocumentId,
    ItemName,
    ItemSumMinor,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Documents::DocNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Documents::DocDate).timestamp().not_null())
                    .col(
                        ColumnDef::new(Documents::TotalSumMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Documents::Notes).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentDetails::DocumentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentDetails::ItemName).string().not_null())
                    .col(ColumnDef::new(DocumentDetails::ItemSumMinor).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-document_details-document_id")
                            .from(DocumentDetails::Table, DocumentDetails::DocumentId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-document_details-document_id")
                    .table(DocumentDetails::Table)
                    .col(DocumentDetails::DocumentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        Ok(())
    }
}
