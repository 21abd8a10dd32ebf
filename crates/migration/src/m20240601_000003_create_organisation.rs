//! Create `organisation` table with FK `owner_id -> user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organisation::Table)
                    .if_not_exists()
                    .col(uuid(Organisation::Id).primary_key())
                    .col(string_len(Organisation::Name, 255).not_null())
                    .col(text(Organisation::Description).not_null())
                    .col(string_len(Organisation::Email, 255).unique_key().not_null())
                    .col(string_len(Organisation::State, 128).not_null())
                    .col(string_len(Organisation::Industry, 128).not_null())
                    .col(string_len(Organisation::Type, 128).not_null())
                    .col(uuid(Organisation::OwnerId).not_null())
                    .col(string_len(Organisation::Address, 255).not_null())
                    .col(string_len(Organisation::Country, 128).not_null())
                    .col(timestamp_with_time_zone(Organisation::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Organisation::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Organisation::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organisation_owner")
                            .from(Organisation::Table, Organisation::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Organisation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Organisation {
    Table,
    Id,
    Name,
    Description,
    Email,
    State,
    Industry,
    Type,
    OwnerId,
    Address,
    Country,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
