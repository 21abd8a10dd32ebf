//! Create `newsletter` subscription table; email unique across active and soft-deleted rows.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Newsletter::Table)
                    .if_not_exists()
                    .col(uuid(Newsletter::Id).primary_key())
                    .col(string_len(Newsletter::Email, 255).unique_key().not_null())
                    .col(timestamp_with_time_zone(Newsletter::CreatedAt).not_null())
                    .col(
                        ColumnDef::new(Newsletter::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Newsletter::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Newsletter { Table, Id, Email, CreatedAt, DeletedAt }
