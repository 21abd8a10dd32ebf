use async_trait::async_trait;
use models::{invitation, user_organisation};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait};
use uuid::Uuid;

use super::repository::InvitationRepository;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};

pub struct SeaOrmInvitationRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl InvitationRepository for SeaOrmInvitationRepository {
    async fn insert(&self, inv: invitation::Model) -> Result<invitation::Model, ServiceError> {
        let am: invitation::ActiveModel = inv.into();
        Ok(am.insert(&self.db).await?)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<invitation::Model>, ServiceError> {
        Ok(invitation::find_by_token(&self.db, token).await?)
    }

    async fn consume(&self, token: &str) -> Result<bool, ServiceError> {
        Ok(invitation::consume(&self.db, token).await?)
    }

    async fn redeem(&self, token: &str, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError> {
        // 消费与入组同一事务：入组失败时回滚，令牌仍可再次使用
        let txn = self.db.begin().await?;
        if !invitation::consume(&txn, token).await? {
            txn.rollback().await?;
            return Ok(false);
        }
        user_organisation::add_if_absent(&txn, user_id, org_id).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn list(&self, page: Pagination) -> Result<Page<invitation::Model>, ServiceError> {
        let select = invitation::Entity::find().order_by_desc(invitation::Column::CreatedAt);
        fetch_page(&self.db, select, page).await
    }
}
