//! Create `notification` and `notification_settings` tables, both keyed to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(uuid(Notification::Id).primary_key())
                    .col(uuid(Notification::UserId).not_null())
                    .col(text(Notification::Message).not_null())
                    .col(boolean(Notification::IsRead).not_null().default(false))
                    .col(timestamp_with_time_zone(Notification::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_user")
                            .from(Notification::Table, Notification::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationSettings::Table)
                    .if_not_exists()
                    .col(uuid(NotificationSettings::Id).primary_key())
                    .col(uuid(NotificationSettings::UserId).unique_key().not_null())
                    .col(boolean(NotificationSettings::MobilePushNotifications).not_null().default(false))
                    .col(boolean(NotificationSettings::EmailNotificationActivityInWorkspace).not_null().default(false))
                    .col(boolean(NotificationSettings::EmailNotificationAlwaysSendEmailNotifications).not_null().default(false))
                    .col(boolean(NotificationSettings::EmailNotificationEmailDigest).not_null().default(false))
                    .col(boolean(NotificationSettings::EmailNotificationAnnouncementAndUpdateEmails).not_null().default(false))
                    .col(boolean(NotificationSettings::SlackNotificationsActivityOnYourWorkspace).not_null().default(false))
                    .col(boolean(NotificationSettings::SlackNotificationsAlwaysSendEmailNotifications).not_null().default(false))
                    .col(boolean(NotificationSettings::SlackNotificationsAnnouncementAndUpdateEmails).not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_settings_user")
                            .from(NotificationSettings::Table, NotificationSettings::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationSettings::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Notification::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Notification { Table, Id, UserId, Message, IsRead, CreatedAt }

#[derive(DeriveIden)]
enum NotificationSettings {
    Table,
    Id,
    UserId,
    MobilePushNotifications,
    EmailNotificationActivityInWorkspace,
    EmailNotificationAlwaysSendEmailNotifications,
    EmailNotificationEmailDigest,
    EmailNotificationAnnouncementAndUpdateEmails,
    SlackNotificationsActivityOnYourWorkspace,
    SlackNotificationsAlwaysSendEmailNotifications,
    SlackNotificationsAnnouncementAndUpdateEmails,
}

#[derive(DeriveIden)]
enum User { Table, Id }
