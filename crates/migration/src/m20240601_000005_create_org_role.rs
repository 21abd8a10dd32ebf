//! Create `org_role` table; role names are unique within an organisation.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrgRole::Table)
                    .if_not_exists()
                    .col(uuid(OrgRole::Id).primary_key())
                    .col(string_len(OrgRole::Name, 20).not_null())
                    .col(text(OrgRole::Description).not_null())
                    .col(uuid(OrgRole::OrganisationId).not_null())
                    .col(timestamp_with_time_zone(OrgRole::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(OrgRole::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_org_role_organisation")
                            .from(OrgRole::Table, OrgRole::OrganisationId)
                            .to(Organisation::Table, Organisation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OrgRole::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OrgRole { Table, Id, Name, Description, OrganisationId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Organisation { Table, Id }
