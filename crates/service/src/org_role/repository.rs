use async_trait::async_trait;
use models::{org_role, permission};
use uuid::Uuid;

use crate::errors::ServiceError;

#[async_trait]
pub trait OrgRoleRepository: Send + Sync {
    async fn find_role(&self, org_id: Uuid, role_id: Uuid) -> Result<Option<org_role::Model>, ServiceError>;
    /// Case-sensitive lookup of a role name inside one organisation.
    async fn find_role_by_name(&self, org_id: Uuid, name: &str) -> Result<Option<org_role::Model>, ServiceError>;
    async fn list_roles(&self, org_id: Uuid) -> Result<Vec<org_role::Model>, ServiceError>;
    async fn insert_role(&self, role: org_role::Model) -> Result<org_role::Model, ServiceError>;
    async fn update_role(&self, role: org_role::Model) -> Result<org_role::Model, ServiceError>;
    /// Remove the role together with its permission row.
    async fn delete_role(&self, role_id: Uuid) -> Result<(), ServiceError>;

    async fn find_permission(&self, role_id: Uuid) -> Result<Option<permission::Model>, ServiceError>;
    /// Insert or replace the single permission row of a role.
    async fn save_permission(&self, perm: permission::Model) -> Result<permission::Model, ServiceError>;
}

pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockOrgRoleRepository {
        roles: Mutex<HashMap<Uuid, org_role::Model>>,
        perms: Mutex<HashMap<Uuid, permission::Model>>, // key: role_id
    }

    impl MockOrgRoleRepository {
        pub fn permission_count(&self) -> usize {
            self.perms.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OrgRoleRepository for MockOrgRoleRepository {
        async fn find_role(&self, org_id: Uuid, role_id: Uuid) -> Result<Option<org_role::Model>, ServiceError> {
            Ok(self.roles.lock().unwrap().get(&role_id).filter(|r| r.organisation_id == org_id).cloned())
        }

        async fn find_role_by_name(&self, org_id: Uuid, name: &str) -> Result<Option<org_role::Model>, ServiceError> {
            Ok(self
                .roles
                .lock()
                .unwrap()
                .values()
                .find(|r| r.organisation_id == org_id && r.name == name)
                .cloned())
        }

        async fn list_roles(&self, org_id: Uuid) -> Result<Vec<org_role::Model>, ServiceError> {
            let mut out: Vec<_> = self.roles.lock().unwrap().values().filter(|r| r.organisation_id == org_id).cloned().collect();
            out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(out)
        }

        async fn insert_role(&self, role: org_role::Model) -> Result<org_role::Model, ServiceError> {
            self.roles.lock().unwrap().insert(role.id, role.clone());
            Ok(role)
        }

        async fn update_role(&self, role: org_role::Model) -> Result<org_role::Model, ServiceError> {
            self.roles.lock().unwrap().insert(role.id, role.clone());
            Ok(role)
        }

        async fn delete_role(&self, role_id: Uuid) -> Result<(), ServiceError> {
            self.perms.lock().unwrap().remove(&role_id);
            self.roles.lock().unwrap().remove(&role_id);
            Ok(())
        }

        async fn find_permission(&self, role_id: Uuid) -> Result<Option<permission::Model>, ServiceError> {
            Ok(self.perms.lock().unwrap().get(&role_id).cloned())
        }

        async fn save_permission(&self, perm: permission::Model) -> Result<permission::Model, ServiceError> {
            self.perms.lock().unwrap().insert(perm.role_id, perm.clone());
            Ok(perm)
        }
    }
}
