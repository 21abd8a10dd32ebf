use uuid::Uuid;
use sea_orm::{
    sea_query::OnConflict, DatabaseConnection, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;

use models::{notification, notification_settings::{self, SettingsPatch}};
use crate::errors::ServiceError;

#[derive(Clone, Debug, Serialize)]
pub struct NotificationSummary {
    pub total_notification_count: u64,
    pub total_unread_notification_count: u64,
    pub notifications: Vec<notification::Model>,
}

/// Parse the `:is_read` path segment; only `true`/`false` are accepted.
pub fn parse_is_read(raw: &str) -> Result<bool, ServiceError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ServiceError::BadRequest("is_read must be true or false".into())),
    }
}

pub async fn create_notification(db: &DatabaseConnection, user_id: Uuid, message: &str) -> Result<notification::Model, ServiceError> {
    let am: notification::ActiveModel = notification::new_model(user_id, message)?.into();
    let created = am.insert(db).await?;
    info!(notification_id = %created.id, %user_id, "notification_created");
    Ok(created)
}

/// Notifications of one user, newest first, with total and unread counts.
/// `is_read` narrows the listed rows; the counts always cover every row of the user.
pub async fn list_notifications(
    db: &DatabaseConnection,
    user_id: Uuid,
    is_read: Option<bool>,
) -> Result<NotificationSummary, ServiceError> {
    let base = notification::Entity::find().filter(notification::Column::UserId.eq(user_id));
    let total = base.clone().count(db).await?;
    let unread = base.clone().filter(notification::Column::IsRead.eq(false)).count(db).await?;
    let mut select = base.order_by_desc(notification::Column::CreatedAt);
    if let Some(flag) = is_read {
        select = select.filter(notification::Column::IsRead.eq(flag));
    }
    let notifications = select.all(db).await?;
    Ok(NotificationSummary { total_notification_count: total, total_unread_notification_count: unread, notifications })
}

async fn owned(db: &DatabaseConnection, user_id: Uuid, id: Uuid) -> Result<notification::Model, ServiceError> {
    notification::Entity::find_by_id(id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("notification"))
}

pub async fn mark_read(db: &DatabaseConnection, user_id: Uuid, id: Uuid, is_read: bool) -> Result<notification::Model, ServiceError> {
    let mut am: notification::ActiveModel = owned(db, user_id, id).await?.into();
    am.is_read = Set(is_read);
    Ok(am.update(db).await?)
}

pub async fn delete_notification(db: &DatabaseConnection, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    owned(db, user_id, id).await?;
    notification::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

async fn find_settings(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<notification_settings::Model>, ServiceError> {
    Ok(notification_settings::Entity::find()
        .filter(notification_settings::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Settings of the user; a default row is created on first read.
pub async fn get_settings(db: &DatabaseConnection, user_id: Uuid) -> Result<notification_settings::Model, ServiceError> {
    if let Some(found) = find_settings(db, user_id).await? {
        return Ok(found);
    }
    // user_id 唯一：并发首读时只有一个插入生效，其余回读同一行
    let am: notification_settings::ActiveModel = notification_settings::defaults_for(user_id).into();
    notification_settings::Entity::insert(am)
        .on_conflict(OnConflict::column(notification_settings::Column::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    find_settings(db, user_id).await?.ok_or_else(|| ServiceError::not_found("notification settings"))
}

pub async fn update_settings(
    db: &DatabaseConnection,
    user_id: Uuid,
    patch: &SettingsPatch,
) -> Result<notification_settings::Model, ServiceError> {
    let mut current = get_settings(db, user_id).await?;
    patch.apply(&mut current);
    let am = notification_settings::ActiveModel::from(current).reset_all();
    Ok(am.update(db).await?)
}
