use async_trait::async_trait;
use chrono::Utc;
use models::{errors::is_unique_violation, newsletter};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::repository::NewsletterRepository;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};

pub struct SeaOrmNewsletterRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl NewsletterRepository for SeaOrmNewsletterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<newsletter::Model>, ServiceError> {
        Ok(newsletter::Entity::find()
            .filter(newsletter::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<newsletter::Model>, ServiceError> {
        Ok(newsletter::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert(&self, row: newsletter::Model) -> Result<newsletter::Model, ServiceError> {
        let am: newsletter::ActiveModel = row.into();
        am.insert(&self.db).await.map_err(|e| {
            // 并发订阅同一邮箱时由唯一约束兜底
            if is_unique_violation(&e) {
                ServiceError::Conflict(super::service::ALREADY_SUBSCRIBED.into())
            } else {
                ServiceError::Db(e.to_string())
            }
        })
    }

    async fn set_deleted(&self, id: Uuid, deleted: bool) -> Result<(), ServiceError> {
        let value = if deleted { Some(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())) } else { None };
        newsletter::Entity::update_many()
            .col_expr(newsletter::Column::DeletedAt, Expr::value(value))
            .filter(newsletter::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn list(&self, deleted: bool, page: Pagination) -> Result<Page<newsletter::Model>, ServiceError> {
        let filter = if deleted {
            newsletter::Column::DeletedAt.is_not_null()
        } else {
            newsletter::Column::DeletedAt.is_null()
        };
        let select = newsletter::Entity::find()
            .filter(filter)
            .order_by_desc(newsletter::Column::CreatedAt);
        fetch_page(&self.db, select, page).await
    }
}
