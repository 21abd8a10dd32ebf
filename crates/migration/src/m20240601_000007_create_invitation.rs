//! Create `invitation` table. Tokens are unique and single-use.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invitation::Table)
                    .if_not_exists()
                    .col(uuid(Invitation::Id).primary_key())
                    .col(uuid(Invitation::OrganisationId).not_null())
                    .col(uuid(Invitation::InviterId).not_null())
                    .col(string_len(Invitation::Email, 255).not_null())
                    .col(string_len(Invitation::Token, 64).unique_key().not_null())
                    .col(boolean(Invitation::IsValid).not_null().default(true))
                    .col(timestamp_with_time_zone(Invitation::ExpiresAt).not_null())
                    .col(timestamp_with_time_zone(Invitation::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invitation_organisation")
                            .from(Invitation::Table, Invitation::OrganisationId)
                            .to(Organisation::Table, Organisation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invitation_inviter")
                            .from(Invitation::Table, Invitation::InviterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Invitation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Invitation { Table, Id, OrganisationId, InviterId, Email, Token, IsValid, ExpiresAt, CreatedAt }

#[derive(DeriveIden)]
enum Organisation { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
