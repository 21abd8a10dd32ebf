use async_trait::async_trait;
use models::organisation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Public view of an organisation member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[async_trait]
pub trait OrganisationRepository: Send + Sync {
    /// Live (not soft-deleted) organisation by id.
    async fn find(&self, id: Uuid) -> Result<Option<organisation::Model>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<organisation::Model>, ServiceError>;
    /// Insert the organisation and its owner's membership together.
    async fn create_with_owner(&self, org: organisation::Model) -> Result<organisation::Model, ServiceError>;
    async fn update(&self, org: organisation::Model) -> Result<organisation::Model, ServiceError>;
    async fn soft_delete(&self, id: Uuid) -> Result<(), ServiceError>;

    async fn user_exists(&self, user_id: Uuid) -> Result<bool, ServiceError>;
    async fn is_member(&self, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError>;
    /// Add-if-absent; `true` when the membership was created.
    async fn add_member(&self, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError>;
    async fn list_members(&self, org_id: Uuid, page: Pagination) -> Result<Page<Member>, ServiceError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<organisation::Model>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockOrganisationRepository {
        orgs: Mutex<HashMap<Uuid, organisation::Model>>,
        members: Mutex<BTreeSet<(Uuid, Uuid)>>, // (org_id, user_id)
        users: Mutex<HashMap<Uuid, Member>>,
        fail_membership_writes: AtomicBool,
    }

    impl MockOrganisationRepository {
        /// Make a user known to the repository (membership listing, add-user checks).
        pub fn seed_user(&self, id: Uuid, name: &str, email: &str) {
            self.users.lock().unwrap().insert(id, Member { id, name: name.into(), email: email.into() });
        }

        pub fn member_count(&self, org_id: Uuid) -> usize {
            self.members.lock().unwrap().iter().filter(|(o, _)| *o == org_id).count()
        }

        /// Make every membership write fail with a database error until switched off.
        pub fn fail_membership_writes(&self, on: bool) {
            self.fail_membership_writes.store(on, Ordering::SeqCst);
        }

        /// Synchronous add-if-absent, shared with other in-memory repositories.
        pub fn insert_member(&self, org_id: Uuid, user_id: Uuid) -> Result<bool, ServiceError> {
            if self.fail_membership_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("connection reset".into()));
            }
            Ok(self.members.lock().unwrap().insert((org_id, user_id)))
        }
    }

    #[async_trait]
    impl OrganisationRepository for MockOrganisationRepository {
        async fn find(&self, id: Uuid) -> Result<Option<organisation::Model>, ServiceError> {
            Ok(self.orgs.lock().unwrap().get(&id).filter(|o| o.deleted_at.is_none()).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<organisation::Model>, ServiceError> {
            Ok(self.orgs.lock().unwrap().values().find(|o| o.email == email).cloned())
        }

        async fn create_with_owner(&self, org: organisation::Model) -> Result<organisation::Model, ServiceError> {
            self.members.lock().unwrap().insert((org.id, org.owner_id));
            self.orgs.lock().unwrap().insert(org.id, org.clone());
            Ok(org)
        }

        async fn update(&self, org: organisation::Model) -> Result<organisation::Model, ServiceError> {
            self.orgs.lock().unwrap().insert(org.id, org.clone());
            Ok(org)
        }

        async fn soft_delete(&self, id: Uuid) -> Result<(), ServiceError> {
            if let Some(o) = self.orgs.lock().unwrap().get_mut(&id) {
                o.deleted_at = Some(chrono::Utc::now().into());
            }
            Ok(())
        }

        async fn user_exists(&self, user_id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.users.lock().unwrap().contains_key(&user_id))
        }

        async fn is_member(&self, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.members.lock().unwrap().contains(&(org_id, user_id)))
        }

        async fn add_member(&self, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError> {
            self.insert_member(org_id, user_id)
        }

        async fn list_members(&self, org_id: Uuid, page: Pagination) -> Result<Page<Member>, ServiceError> {
            let users = self.users.lock().unwrap();
            let all: Vec<Member> = self
                .members
                .lock()
                .unwrap()
                .iter()
                .filter(|(o, _)| *o == org_id)
                .map(|(_, u)| users.get(u).cloned().unwrap_or(Member { id: *u, name: String::new(), email: String::new() }))
                .collect();
            Ok(Page::from_vec(all, page))
        }

        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<organisation::Model>, ServiceError> {
            let orgs = self.orgs.lock().unwrap();
            Ok(self
                .members
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, u)| *u == user_id)
                .filter_map(|(o, _)| orgs.get(o).filter(|m| m.deleted_at.is_none()).cloned())
                .collect())
        }
    }
}
