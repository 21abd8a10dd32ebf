use async_trait::async_trait;
use models::{organisation, user, user_organisation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, TransactionTrait,
};
use uuid::Uuid;

use super::repository::{Member, OrganisationRepository};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};

/// SeaORM-backed repository implementation.
pub struct SeaOrmOrganisationRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl OrganisationRepository for SeaOrmOrganisationRepository {
    async fn find(&self, id: Uuid) -> Result<Option<organisation::Model>, ServiceError> {
        Ok(organisation::find_live(&self.db, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<organisation::Model>, ServiceError> {
        Ok(organisation::Entity::find()
            .filter(organisation::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn create_with_owner(&self, org: organisation::Model) -> Result<organisation::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let owner_id = org.owner_id;
        let am: organisation::ActiveModel = org.into();
        let created = am.insert(&txn).await?;
        user_organisation::add_if_absent(&txn, owner_id, created.id).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn update(&self, org: organisation::Model) -> Result<organisation::Model, ServiceError> {
        // reset_all marks every column dirty so the full row is written
        let am = organisation::ActiveModel::from(org).reset_all();
        Ok(am.update(&self.db).await?)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(organisation::soft_delete(&self.db, id).await?)
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool, ServiceError> {
        let found = user::Entity::find_by_id(user_id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn is_member(&self, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError> {
        Ok(user_organisation::is_member(&self.db, user_id, org_id).await?)
    }

    async fn add_member(&self, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError> {
        Ok(user_organisation::add_if_absent(&self.db, user_id, org_id).await?)
    }

    async fn list_members(&self, org_id: Uuid, page: Pagination) -> Result<Page<Member>, ServiceError> {
        let select = user::Entity::find()
            .join(JoinType::InnerJoin, user::Relation::Memberships.def())
            .filter(user_organisation::Column::OrganisationId.eq(org_id))
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::CreatedAt);
        let page = fetch_page(&self.db, select, page).await?;
        Ok(page.map(|u| Member { id: u.id, name: u.name, email: u.email }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<organisation::Model>, ServiceError> {
        Ok(organisation::Entity::find()
            .join(JoinType::InnerJoin, organisation::Relation::Memberships.def())
            .filter(user_organisation::Column::UserId.eq(user_id))
            .filter(organisation::Column::DeletedAt.is_null())
            .order_by_desc(organisation::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
