use async_trait::async_trait;
use models::invitation;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn insert(&self, inv: invitation::Model) -> Result<invitation::Model, ServiceError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<invitation::Model>, ServiceError>;
    /// Atomically flip `is_valid` true -> false. Only one caller per token gets `true`.
    async fn consume(&self, token: &str) -> Result<bool, ServiceError>;
    /// Consume the token and add `user_id` to `org_id` as one unit of work.
    /// `false` means the token was already used; a failed membership write leaves it valid.
    async fn redeem(&self, token: &str, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError>;
    /// Newest first.
    async fn list(&self, page: Pagination) -> Result<Page<invitation::Model>, ServiceError>;
}

pub mod mock {
    use super::*;
    use crate::organisation::repository::mock::MockOrganisationRepository;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub struct MockInvitationRepository {
        invites: Mutex<HashMap<String, invitation::Model>>, // key: token
        members: Option<Arc<MockOrganisationRepository>>,
    }

    impl MockInvitationRepository {
        /// Redeemed invitations write memberships into `orgs`.
        pub fn with_members(orgs: Arc<MockOrganisationRepository>) -> Self {
            Self { invites: Mutex::default(), members: Some(orgs) }
        }

        pub fn count(&self) -> usize {
            self.invites.lock().unwrap().len()
        }

        /// Overwrite a stored invitation, e.g. to move its expiry into the past.
        pub fn put(&self, inv: invitation::Model) {
            self.invites.lock().unwrap().insert(inv.token.clone(), inv);
        }
    }

    #[async_trait]
    impl InvitationRepository for MockInvitationRepository {
        async fn insert(&self, inv: invitation::Model) -> Result<invitation::Model, ServiceError> {
            self.put(inv.clone());
            Ok(inv)
        }

        async fn find_by_token(&self, token: &str) -> Result<Option<invitation::Model>, ServiceError> {
            Ok(self.invites.lock().unwrap().get(token).cloned())
        }

        async fn consume(&self, token: &str) -> Result<bool, ServiceError> {
            // the lock makes check-and-set a single step
            let mut invites = self.invites.lock().unwrap();
            match invites.get_mut(token) {
                Some(inv) if inv.is_valid => {
                    inv.is_valid = false;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn redeem(&self, token: &str, user_id: Uuid, org_id: Uuid) -> Result<bool, ServiceError> {
            let mut invites = self.invites.lock().unwrap();
            let Some(inv) = invites.get_mut(token).filter(|i| i.is_valid) else {
                return Ok(false);
            };
            // membership first: on error the token stays untouched
            if let Some(orgs) = &self.members {
                orgs.insert_member(org_id, user_id)?;
            }
            inv.is_valid = false;
            Ok(true)
        }

        async fn list(&self, page: Pagination) -> Result<Page<invitation::Model>, ServiceError> {
            let mut all: Vec<_> = self.invites.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(Page::from_vec(all, page))
        }
    }
}
