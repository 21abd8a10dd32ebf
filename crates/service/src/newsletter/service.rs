use std::sync::Arc;

use models::{newsletter, user};
use tracing::{info, instrument};
use uuid::Uuid;

use super::repository::NewsletterRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

pub const ALREADY_SUBSCRIBED: &str = "email already subscribed";

pub struct NewsletterService {
    repo: Arc<dyn NewsletterRepository>,
}

impl NewsletterService {
    pub fn new(repo: Arc<dyn NewsletterRepository>) -> Self { Self { repo } }

    /// Subscribe an address. A soft-deleted row still counts as subscribed.
    ///
    /// # Examples
    /// ```
    /// use service::newsletter::{NewsletterService, repository::mock::MockNewsletterRepository};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockNewsletterRepository::default());
    /// let svc = NewsletterService::new(repo.clone());
    /// tokio_test::block_on(svc.subscribe("reader@example.com")).unwrap();
    /// assert!(tokio_test::block_on(svc.subscribe("Reader@Example.com")).is_err());
    /// assert_eq!(repo.row_count(), 1);
    /// ```
    #[instrument(skip(self))]
    pub async fn subscribe(&self, email: &str) -> Result<newsletter::Model, ServiceError> {
        let email = user::normalize_email(email);
        if user::validate_email(&email).is_err() {
            return Err(ServiceError::Unprocessable("invalid email".into()));
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(ALREADY_SUBSCRIBED.into()));
        }
        let row = self.repo.insert(newsletter::new_model(&email)).await?;
        info!(id = %row.id, "newsletter_subscribed");
        Ok(row)
    }

    pub async fn list(&self, page: Pagination) -> Result<Page<newsletter::Model>, ServiceError> {
        self.repo.list(false, page).await
    }

    pub async fn list_deleted(&self, page: Pagination) -> Result<Page<newsletter::Model>, ServiceError> {
        self.repo.list(true, page).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let row = self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("newsletter email"))?;
        if row.deleted_at.is_none() {
            self.repo.set_deleted(id, true).await?;
            info!(%id, "newsletter_deleted");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn restore(&self, id: Uuid) -> Result<(), ServiceError> {
        let row = self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("newsletter email"))?;
        if row.deleted_at.is_none() {
            return Err(ServiceError::BadRequest("newsletter email is not soft-deleted".into()));
        }
        self.repo.set_deleted(id, false).await?;
        info!(%id, "newsletter_restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newsletter::repository::mock::MockNewsletterRepository;

    fn setup() -> (Arc<MockNewsletterRepository>, NewsletterService) {
        let repo = Arc::new(MockNewsletterRepository::default());
        (repo.clone(), NewsletterService::new(repo))
    }

    #[tokio::test]
    async fn duplicate_subscription_conflicts_without_second_row() {
        let (repo, svc) = setup();
        svc.subscribe("a@example.com").await.unwrap();
        let err = svc.subscribe(" A@EXAMPLE.com ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(err.to_string(), ALREADY_SUBSCRIBED);
        assert_eq!(repo.row_count(), 1);
    }

    #[tokio::test]
    async fn invalid_email_is_unprocessable() {
        let (_, svc) = setup();
        assert!(matches!(svc.subscribe("not-an-email").await, Err(ServiceError::Unprocessable(_))));
    }

    #[tokio::test]
    async fn soft_deleted_blocks_resubscribe_until_restored() {
        let (_, svc) = setup();
        let row = svc.subscribe("a@example.com").await.unwrap();
        svc.delete(row.id).await.unwrap();
        assert!(svc.list(Pagination::default()).await.unwrap().items.is_empty());
        assert_eq!(svc.list_deleted(Pagination::default()).await.unwrap().items.len(), 1);
        assert!(matches!(svc.subscribe("a@example.com").await, Err(ServiceError::Conflict(_))));

        svc.restore(row.id).await.unwrap();
        assert_eq!(svc.list(Pagination::default()).await.unwrap().items.len(), 1);
        let err = svc.restore(row.id).await.unwrap_err();
        assert_eq!(err.to_string(), "newsletter email is not soft-deleted");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_, svc) = setup();
        assert!(matches!(svc.delete(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.restore(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }
}
