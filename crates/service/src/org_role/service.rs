use std::sync::Arc;

use chrono::Utc;
use models::{org_role, permission::{self, PermissionList}};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::repository::OrgRoleRepository;
use crate::errors::ServiceError;
use crate::organisation::{ensure_owner, repository::OrganisationRepository};

pub const ROLE_EXISTS_MESSAGE: &str = "role name already exists";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoleInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RolePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PermissionUpdate {
    pub category: Option<String>,
    #[serde(default)]
    pub permission_list: PermissionList,
}

#[derive(Clone, Debug, Serialize)]
pub struct PermissionView {
    pub id: Uuid,
    pub category: String,
    pub permission_list: PermissionList,
}

impl From<permission::Model> for PermissionView {
    fn from(p: permission::Model) -> Self {
        let permission_list = p.flags();
        Self { id: p.id, category: p.category, permission_list }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: org_role::Model,
    pub permissions: Option<PermissionView>,
}

/// Role management for one organisation; callers must own the organisation.
pub struct OrgRoleService {
    roles: Arc<dyn OrgRoleRepository>,
    orgs: Arc<dyn OrganisationRepository>,
}

impl OrgRoleService {
    pub fn new(roles: Arc<dyn OrgRoleRepository>, orgs: Arc<dyn OrganisationRepository>) -> Self {
        Self { roles, orgs }
    }

    async fn role_or_404(&self, org_id: Uuid, role_id: Uuid) -> Result<org_role::Model, ServiceError> {
        self.roles.find_role(org_id, role_id).await?.ok_or_else(|| ServiceError::not_found("role"))
    }

    /// # Examples
    /// ```
    /// use service::org_role::{OrgRoleService, RoleInput, repository::mock::MockOrgRoleRepository};
    /// use service::organisation::{OrganisationService, repository::mock::MockOrganisationRepository};
    /// use models::organisation::NewOrganisation;
    /// use std::sync::Arc;
    /// let orgs = Arc::new(MockOrganisationRepository::default());
    /// let owner = uuid::Uuid::new_v4();
    /// let org = tokio_test::block_on(OrganisationService::new(orgs.clone())
    ///     .create(owner, NewOrganisation { name: "acme".into(), email: "a@acme.io".into(), ..Default::default() }))
    ///     .unwrap();
    /// let svc = OrgRoleService::new(Arc::new(MockOrgRoleRepository::default()), orgs);
    /// let role = tokio_test::block_on(svc.create(org.id, owner, RoleInput { name: "auditor".into(), description: "read only".into() })).unwrap();
    /// assert_eq!(role.name, "auditor");
    /// ```
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, org_id: Uuid, user_id: Uuid, input: RoleInput) -> Result<org_role::Model, ServiceError> {
        ensure_owner(self.orgs.as_ref(), org_id, user_id).await?;
        let role = org_role::new_model(org_id, &input.name, &input.description)?;
        if self.roles.find_role_by_name(org_id, &role.name).await?.is_some() {
            return Err(ServiceError::Conflict(ROLE_EXISTS_MESSAGE.into()));
        }
        let role = self.roles.insert_role(role).await?;
        info!(%org_id, role_id = %role.id, "org_role_created");
        Ok(role)
    }

    pub async fn list(&self, org_id: Uuid, user_id: Uuid) -> Result<Vec<org_role::Model>, ServiceError> {
        ensure_owner(self.orgs.as_ref(), org_id, user_id).await?;
        self.roles.list_roles(org_id).await
    }

    pub async fn get(&self, org_id: Uuid, user_id: Uuid, role_id: Uuid) -> Result<RoleWithPermissions, ServiceError> {
        ensure_owner(self.orgs.as_ref(), org_id, user_id).await?;
        let role = self.role_or_404(org_id, role_id).await?;
        let permissions = self.roles.find_permission(role.id).await?.map(PermissionView::from);
        Ok(RoleWithPermissions { role, permissions })
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, org_id: Uuid, user_id: Uuid, role_id: Uuid, patch: RolePatch) -> Result<org_role::Model, ServiceError> {
        ensure_owner(self.orgs.as_ref(), org_id, user_id).await?;
        let mut role = self.role_or_404(org_id, role_id).await?;
        if let Some(name) = &patch.name {
            org_role::validate_name(name)?;
            let name = name.trim().to_string();
            if let Some(other) = self.roles.find_role_by_name(org_id, &name).await? {
                if other.id != role.id {
                    return Err(ServiceError::Conflict(ROLE_EXISTS_MESSAGE.into()));
                }
            }
            role.name = name;
        }
        if let Some(desc) = &patch.description {
            role.description = desc.trim().to_string();
        }
        role.updated_at = Utc::now().into();
        let role = self.roles.update_role(role).await?;
        info!(%org_id, %role_id, "org_role_updated");
        Ok(role)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, org_id: Uuid, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError> {
        ensure_owner(self.orgs.as_ref(), org_id, user_id).await?;
        self.role_or_404(org_id, role_id).await?;
        self.roles.delete_role(role_id).await?;
        info!(%org_id, %role_id, "org_role_deleted");
        Ok(())
    }

    /// Create the permission row or merge `update.permission_list` into the stored flags.
    #[instrument(skip(self, update))]
    pub async fn update_permissions(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        update: PermissionUpdate,
    ) -> Result<PermissionView, ServiceError> {
        ensure_owner(self.orgs.as_ref(), org_id, user_id).await?;
        let role = self.role_or_404(org_id, role_id).await?;
        let saved = match self.roles.find_permission(role.id).await? {
            Some(mut existing) => {
                let mut flags = existing.flags();
                flags.extend(update.permission_list);
                existing.permission_list = permission::to_json(&flags);
                if let Some(cat) = &update.category {
                    existing.category = cat.trim().to_string();
                }
                existing.updated_at = Utc::now().into();
                self.roles.save_permission(existing).await?
            }
            None => {
                let category = update.category.as_deref().unwrap_or_default();
                let fresh = permission::new_model(role.id, category, &update.permission_list)?;
                self.roles.save_permission(fresh).await?
            }
        };
        info!(%org_id, %role_id, "org_role_permissions_updated");
        Ok(saved.into())
    }
}
