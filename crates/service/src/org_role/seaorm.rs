use async_trait::async_trait;
use models::{errors::is_unique_violation, org_role, permission};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use super::repository::OrgRoleRepository;
use crate::errors::ServiceError;

pub struct SeaOrmOrgRoleRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl OrgRoleRepository for SeaOrmOrgRoleRepository {
    async fn find_role(&self, org_id: Uuid, role_id: Uuid) -> Result<Option<org_role::Model>, ServiceError> {
        Ok(org_role::Entity::find_by_id(role_id)
            .filter(org_role::Column::OrganisationId.eq(org_id))
            .one(&self.db)
            .await?)
    }

    async fn find_role_by_name(&self, org_id: Uuid, name: &str) -> Result<Option<org_role::Model>, ServiceError> {
        Ok(org_role::Entity::find()
            .filter(org_role::Column::OrganisationId.eq(org_id))
            .filter(org_role::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    async fn list_roles(&self, org_id: Uuid) -> Result<Vec<org_role::Model>, ServiceError> {
        Ok(org_role::Entity::find()
            .filter(org_role::Column::OrganisationId.eq(org_id))
            .order_by_asc(org_role::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn insert_role(&self, role: org_role::Model) -> Result<org_role::Model, ServiceError> {
        let am: org_role::ActiveModel = role.into();
        am.insert(&self.db).await.map_err(map_unique)
    }

    async fn update_role(&self, role: org_role::Model) -> Result<org_role::Model, ServiceError> {
        let am = org_role::ActiveModel::from(role).reset_all();
        am.update(&self.db).await.map_err(map_unique)
    }

    async fn delete_role(&self, role_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        permission::Entity::delete_many()
            .filter(permission::Column::RoleId.eq(role_id))
            .exec(&txn)
            .await?;
        org_role::Entity::delete_by_id(role_id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn find_permission(&self, role_id: Uuid) -> Result<Option<permission::Model>, ServiceError> {
        Ok(permission::Entity::find()
            .filter(permission::Column::RoleId.eq(role_id))
            .one(&self.db)
            .await?)
    }

    async fn save_permission(&self, perm: permission::Model) -> Result<permission::Model, ServiceError> {
        let exists = permission::Entity::find_by_id(perm.id).one(&self.db).await?.is_some();
        let am = permission::ActiveModel::from(perm).reset_all();
        if exists {
            Ok(am.update(&self.db).await?)
        } else {
            Ok(am.insert(&self.db).await?)
        }
    }
}

// uniq_org_role_org_name 兜底：并发创建同名角色时由唯一索引拒绝
fn map_unique(e: sea_orm::DbErr) -> ServiceError {
    if is_unique_violation(&e) {
        ServiceError::Conflict(super::service::ROLE_EXISTS_MESSAGE.into())
    } else {
        ServiceError::Db(e.to_string())
    }
}
