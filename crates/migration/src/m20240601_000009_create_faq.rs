use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Faq::Table)
                    .if_not_exists()
                    .col(uuid(Faq::Id).primary_key())
                    .col(string_len(Faq::Question, 225).unique_key().not_null())
                    .col(text(Faq::Answer).not_null())
                    .col(string_len(Faq::Category, 30).not_null())
                    .col(timestamp_with_time_zone(Faq::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Faq::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Faq::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Faq { Table, Id, Question, Answer, Category, CreatedAt, UpdatedAt }
