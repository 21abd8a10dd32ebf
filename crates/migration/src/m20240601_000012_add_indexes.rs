use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Organisation: index on owner_id
        manager
            .create_index(
                Index::create()
                    .name("idx_organisation_owner")
                    .table(Organisation::Table)
                    .col(Organisation::OwnerId)
                    .to_owned(),
            )
            .await?;

        // UserOrganisation: lookups by organisation (members listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_organisation_org")
                    .table(UserOrganisation::Table)
                    .col(UserOrganisation::OrganisationId)
                    .to_owned(),
            )
            .await?;

        // OrgRole: composite unique (organisation_id, name)
        manager
            .create_index(
                Index::create()
                    .name("uniq_org_role_org_name")
                    .table(OrgRole::Table)
                    .col(OrgRole::OrganisationId)
                    .col(OrgRole::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Invitation: listing per organisation
        manager
            .create_index(
                Index::create()
                    .name("idx_invitation_org")
                    .table(Invitation::Table)
                    .col(Invitation::OrganisationId)
                    .to_owned(),
            )
            .await?;

        // Notification: per-user listing
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_user")
                    .table(Notification::Table)
                    .col(Notification::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_organisation_owner").table(Organisation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_organisation_org").table(UserOrganisation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_org_role_org_name").table(OrgRole::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_invitation_org").table(Invitation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_notification_user").table(Notification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organisation { Table, OwnerId }

#[derive(DeriveIden)]
enum UserOrganisation { Table, OrganisationId }

#[derive(DeriveIden)]
enum OrgRole { Table, OrganisationId, Name }

#[derive(DeriveIden)]
enum Invitation { Table, OrganisationId }

#[derive(DeriveIden)]
enum Notification { Table, UserId }
