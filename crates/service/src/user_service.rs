use uuid::Uuid;
use chrono::Utc;
use sea_orm::{DatabaseConnection, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::info;

use models::user;
use crate::{errors::ServiceError, pagination::{fetch_page, Page, Pagination}};

/// Public projection of a user row.
#[derive(Clone, Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: i32,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<user::Model> for UserView {
    fn from(m: user::Model) -> Self {
        Self { id: m.id, email: m.email, name: m.name, role: m.role, created_at: m.created_at }
    }
}

/// Self or super admin may act on a user record.
pub fn can_manage(actor_id: Uuid, actor_is_super_admin: bool, target: Uuid) -> Result<(), ServiceError> {
    if actor_is_super_admin || actor_id == target {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("user is not authorised to modify this user".into()))
    }
}

/// Get a live user by id.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))
}

/// Update a user's name.
pub async fn update_user_name(db: &DatabaseConnection, id: Uuid, name: &str) -> Result<user::Model, ServiceError> {
    user::validate_name(name)?;
    let mut am: user::ActiveModel = get_user(db, id).await?.into();
    am.name = Set(name.trim().to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    Ok(updated)
}

/// Soft-delete a user (marks deleted_at).
pub async fn soft_delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    get_user(db, id).await?;
    user::soft_delete(db, id).await?;
    Ok(())
}

/// Parse a coarse role id from a path segment.
pub fn parse_role(raw: &str) -> Result<user::UserRole, ServiceError> {
    let id: i32 = raw
        .trim()
        .parse()
        .map_err(|_| ServiceError::BadRequest("Failed to parse request body".into()))?;
    user::UserRole::try_from(id).map_err(|_| ServiceError::NotFound("invalid role".into()))
}

/// Replace a user's coarse role.
pub async fn assign_role(db: &DatabaseConnection, id: Uuid, role: user::UserRole) -> Result<user::Model, ServiceError> {
    let found = user::Entity::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("invalid user".into()))?;
    let mut am: user::ActiveModel = found.into();
    am.role = Set(role.into());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(user_id = %id, role = updated.role, "user_role_assigned");
    Ok(updated)
}

/// List live users, newest first.
pub async fn list_users(db: &DatabaseConnection, opts: Pagination) -> Result<Page<UserView>, ServiceError> {
    let select = user::Entity::find()
        .filter(user::Column::DeletedAt.is_null())
        .order_by_desc(user::Column::CreatedAt);
    Ok(fetch_page(db, select, opts).await?.map(UserView::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[test]
    fn only_self_or_super_admin_can_manage() {
        let me = Uuid::new_v4();
        assert!(can_manage(me, false, me).is_ok());
        assert!(can_manage(me, true, Uuid::new_v4()).is_ok());
        assert!(matches!(can_manage(me, false, Uuid::new_v4()), Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn role_ids_are_parsed_strictly() {
        assert_eq!(parse_role("2").unwrap(), user::UserRole::SuperAdmin);
        assert_eq!(parse_role(" 1 ").unwrap(), user::UserRole::User);
        assert_eq!(parse_role("7").unwrap_err().to_string(), "invalid role");
        assert!(matches!(parse_role("admin"), Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn user_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let email = format!("svc_{}@example.com", Uuid::new_v4());
        let u = user::create(&db, &email, "Svc User", user::UserRole::User).await?;

        let found = get_user(&db, u.id).await?;
        assert_eq!(found.email, email);

        let updated = update_user_name(&db, u.id, "New Name").await?;
        assert_eq!(updated.name, "New Name");

        let promoted = assign_role(&db, u.id, user::UserRole::SuperAdmin).await?;
        assert_eq!(promoted.role, 2);
        assert_eq!(assign_role(&db, Uuid::new_v4(), user::UserRole::User).await.unwrap_err().to_string(), "invalid user");

        let page = list_users(&db, Pagination { page: 1, per_page: 2 }).await?;
        assert!(!page.items.is_empty() && page.items.len() <= 2);

        soft_delete_user(&db, u.id).await?;
        assert!(matches!(get_user(&db, u.id).await, Err(ServiceError::NotFound(_))));

        user::hard_delete(&db, u.id).await?;
        Ok(())
    }
}
