use async_trait::async_trait;
use models::newsletter;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Any row with this email, soft-deleted or not.
    async fn find_by_email(&self, email: &str) -> Result<Option<newsletter::Model>, ServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<newsletter::Model>, ServiceError>;
    async fn insert(&self, row: newsletter::Model) -> Result<newsletter::Model, ServiceError>;
    async fn set_deleted(&self, id: Uuid, deleted: bool) -> Result<(), ServiceError>;
    /// Newest first, filtered on `deleted_at IS [NOT] NULL`.
    async fn list(&self, deleted: bool, page: Pagination) -> Result<Page<newsletter::Model>, ServiceError>;
}

pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockNewsletterRepository {
        rows: Mutex<HashMap<Uuid, newsletter::Model>>,
    }

    impl MockNewsletterRepository {
        pub fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NewsletterRepository for MockNewsletterRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<newsletter::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().values().find(|r| r.email == email).cloned())
        }

        async fn find(&self, id: Uuid) -> Result<Option<newsletter::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, row: newsletter::Model) -> Result<newsletter::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            // unique(email)
            if rows.values().any(|r| r.email == row.email) {
                return Err(ServiceError::Conflict(crate::newsletter::service::ALREADY_SUBSCRIBED.into()));
            }
            rows.insert(row.id, row.clone());
            Ok(row)
        }

        async fn set_deleted(&self, id: Uuid, deleted: bool) -> Result<(), ServiceError> {
            if let Some(r) = self.rows.lock().unwrap().get_mut(&id) {
                r.deleted_at = deleted.then(|| chrono::Utc::now().into());
            }
            Ok(())
        }

        async fn list(&self, deleted: bool, page: Pagination) -> Result<Page<newsletter::Model>, ServiceError> {
            let mut all: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.deleted_at.is_some() == deleted)
                .cloned()
                .collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(Page::from_vec(all, page))
        }
    }
}
