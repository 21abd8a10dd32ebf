//! Create `user_organisation` membership table (composite primary key).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserOrganisation::Table)
                    .if_not_exists()
                    .col(uuid(UserOrganisation::UserId).not_null())
                    .col(uuid(UserOrganisation::OrganisationId).not_null())
                    .col(timestamp_with_time_zone(UserOrganisation::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .col(UserOrganisation::UserId)
                            .col(UserOrganisation::OrganisationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_organisation_user")
                            .from(UserOrganisation::Table, UserOrganisation::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_organisation_organisation")
                            .from(UserOrganisation::Table, UserOrganisation::OrganisationId)
                            .to(Organisation::Table, Organisation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserOrganisation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserOrganisation { Table, UserId, OrganisationId, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Organisation { Table, Id }
