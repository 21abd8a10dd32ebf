//! Create `permission` table: one row per role, flags stored as JSONB.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Permission::Table)
                    .if_not_exists()
                    .col(uuid(Permission::Id).primary_key())
                    .col(uuid(Permission::RoleId).unique_key().not_null())
                    .col(string_len(Permission::Category, 64).not_null())
                    .col(json_binary(Permission::PermissionList).not_null())
                    .col(timestamp_with_time_zone(Permission::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Permission::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permission_org_role")
                            .from(Permission::Table, Permission::RoleId)
                            .to(OrgRole::Table, OrgRole::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Permission::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Permission { Table, Id, RoleId, Category, PermissionList, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum OrgRole { Table, Id }
