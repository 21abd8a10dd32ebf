//! Create `billing` plan table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Billing::Table)
                    .if_not_exists()
                    .col(uuid(Billing::Id).primary_key())
                    .col(string_len(Billing::Name, 128).not_null())
                    .col(double(Billing::Price).not_null())
                    .col(timestamp_with_time_zone(Billing::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Billing::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Billing::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Billing { Table, Id, Name, Price, CreatedAt, UpdatedAt }
