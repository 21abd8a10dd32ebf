use std::sync::Arc;

use models::organisation::{self, NewOrganisation, OrganisationPatch};
use tracing::{info, instrument};
use uuid::Uuid;

use super::repository::{Member, OrganisationRepository};
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

pub const ORG_EXISTS_MESSAGE: &str = "organization already exists with the given email";
pub const ORG_NOT_FOUND_MESSAGE: &str = "organisation not found";
pub const NOT_OWNER_MESSAGE: &str = "not organization owner";

/// Load a live organisation and check that `user_id` owns it.
///
/// Missing organisation -> `NotFound("organisation not found")`;
/// someone else's organisation -> `Forbidden("not organization owner")`.
pub async fn ensure_owner<R: OrganisationRepository + ?Sized>(
    repo: &R,
    org_id: Uuid,
    user_id: Uuid,
) -> Result<organisation::Model, ServiceError> {
    let org = repo
        .find(org_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(ORG_NOT_FOUND_MESSAGE.into()))?;
    if org.owner_id != user_id {
        return Err(ServiceError::Forbidden(NOT_OWNER_MESSAGE.into()));
    }
    Ok(org)
}

pub struct OrganisationService {
    repo: Arc<dyn OrganisationRepository>,
}

impl OrganisationService {
    pub fn new(repo: Arc<dyn OrganisationRepository>) -> Self { Self { repo } }

    pub fn repo(&self) -> Arc<dyn OrganisationRepository> { self.repo.clone() }

    async fn find_or_404(&self, org_id: Uuid) -> Result<organisation::Model, ServiceError> {
        self.repo
            .find(org_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ORG_NOT_FOUND_MESSAGE.into()))
    }

    async fn ensure_member(&self, org_id: Uuid, user_id: Uuid, msg: &str) -> Result<organisation::Model, ServiceError> {
        let org = self.find_or_404(org_id).await?;
        if !self.repo.is_member(user_id, org_id).await? {
            return Err(ServiceError::Forbidden(msg.into()));
        }
        Ok(org)
    }

    /// Create an organisation owned by `owner_id`; the owner becomes its first member.
    ///
    /// # Examples
    /// ```
    /// use service::organisation::{OrganisationService, repository::mock::MockOrganisationRepository};
    /// use models::organisation::NewOrganisation;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockOrganisationRepository::default());
    /// let svc = OrganisationService::new(repo.clone());
    /// let owner = uuid::Uuid::new_v4();
    /// let input = NewOrganisation { name: "Acme".into(), email: "Hello@Acme.io".into(), ..Default::default() };
    /// let org = tokio_test::block_on(svc.create(owner, input)).unwrap();
    /// assert_eq!(org.email, "hello@acme.io");
    /// assert_eq!(repo.member_count(org.id), 1);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, owner_id: Uuid, input: NewOrganisation) -> Result<organisation::Model, ServiceError> {
        let input = input.normalized()?;
        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::BadRequest(ORG_EXISTS_MESSAGE.into()));
        }
        let org = self.repo.create_with_owner(input.into_model(owner_id)).await?;
        info!(org_id = %org.id, %owner_id, "organisation_created");
        Ok(org)
    }

    pub async fn get(&self, org_id: Uuid, user_id: Uuid) -> Result<organisation::Model, ServiceError> {
        self.ensure_member(org_id, user_id, "user not authorised to retrieve this organisation").await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, org_id: Uuid, user_id: Uuid, patch: OrganisationPatch) -> Result<organisation::Model, ServiceError> {
        let mut org = self.ensure_member(org_id, user_id, "user not authorised to update this organisation").await?;
        patch.apply(&mut org)?;
        if patch.email.is_some() {
            if let Some(other) = self.repo.find_by_email(&org.email).await? {
                if other.id != org.id {
                    return Err(ServiceError::BadRequest(ORG_EXISTS_MESSAGE.into()));
                }
            }
        }
        let org = self.repo.update(org).await?;
        info!(%org_id, "organisation_updated");
        Ok(org)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, org_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        ensure_owner(self.repo.as_ref(), org_id, user_id).await?;
        self.repo.soft_delete(org_id).await?;
        info!(%org_id, "organisation_deleted");
        Ok(())
    }

    pub async fn list_users(&self, org_id: Uuid, user_id: Uuid, page: Pagination) -> Result<Page<Member>, ServiceError> {
        self.ensure_member(org_id, user_id, "user not a member of this organisation").await?;
        self.repo.list_members(org_id, page).await
    }

    /// Add an existing user to the organisation (super-admin operation).
    #[instrument(skip(self))]
    pub async fn add_user(&self, org_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        self.find_or_404(org_id).await?;
        if !self.repo.user_exists(user_id).await? {
            return Err(ServiceError::not_found("user"));
        }
        if !self.repo.add_member(user_id, org_id).await? {
            return Err(ServiceError::BadRequest("user already added to organisation".into()));
        }
        info!(%org_id, %user_id, "organisation_user_added");
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<organisation::Model>, ServiceError> {
        self.repo.list_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organisation::repository::mock::MockOrganisationRepository;

    fn setup() -> (Arc<MockOrganisationRepository>, OrganisationService) {
        let repo = Arc::new(MockOrganisationRepository::default());
        (repo.clone(), OrganisationService::new(repo))
    }

    fn acme() -> NewOrganisation {
        NewOrganisation { name: "Acme".into(), email: "info@acme.io".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn duplicate_org_email_is_rejected() {
        let (_, svc) = setup();
        svc.create(Uuid::new_v4(), acme()).await.unwrap();
        let err = svc
            .create(Uuid::new_v4(), NewOrganisation { email: "INFO@acme.io".into(), ..acme() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert_eq!(err.to_string(), ORG_EXISTS_MESSAGE);
    }

    #[tokio::test]
    async fn non_member_cannot_read() {
        let (_, svc) = setup();
        let org = svc.create(Uuid::new_v4(), acme()).await.unwrap();
        let err = svc.get(org.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn ensure_owner_distinguishes_missing_and_foreign() {
        let (repo, svc) = setup();
        let owner = Uuid::new_v4();
        let org = svc.create(owner, acme()).await.unwrap();

        let missing = ensure_owner(repo.as_ref(), Uuid::new_v4(), owner).await.unwrap_err();
        assert_eq!(missing.to_string(), ORG_NOT_FOUND_MESSAGE);

        let foreign = ensure_owner(repo.as_ref(), org.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(foreign, ServiceError::Forbidden(_)));
        assert_eq!(foreign.to_string(), NOT_OWNER_MESSAGE);

        assert!(ensure_owner(repo.as_ref(), org.id, owner).await.is_ok());
    }

    #[tokio::test]
    async fn only_owner_can_delete_and_deleted_org_is_gone() {
        let (repo, svc) = setup();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        repo.seed_user(member, "m", "m@acme.io");
        let org = svc.create(owner, acme()).await.unwrap();
        svc.add_user(org.id, member).await.unwrap();

        assert!(matches!(svc.delete(org.id, member).await, Err(ServiceError::Forbidden(_))));
        svc.delete(org.id, owner).await.unwrap();
        assert!(matches!(svc.get(org.id, owner).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn add_user_twice_is_bad_request() {
        let (repo, svc) = setup();
        let org = svc.create(Uuid::new_v4(), acme()).await.unwrap();
        let u = Uuid::new_v4();
        repo.seed_user(u, "Ada", "ada@acme.io");
        svc.add_user(org.id, u).await.unwrap();
        let err = svc.add_user(org.id, u).await.unwrap_err();
        assert_eq!(err.to_string(), "user already added to organisation");
        assert_eq!(repo.member_count(org.id), 2);
    }

    #[tokio::test]
    async fn member_can_patch_and_list_users() {
        let (repo, svc) = setup();
        let owner = Uuid::new_v4();
        repo.seed_user(owner, "Owner", "o@acme.io");
        let org = svc.create(owner, acme()).await.unwrap();
        let patched = svc
            .update(org.id, owner, OrganisationPatch { country: Some("Ghana".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(patched.country, "ghana");
        let page = svc.list_users(org.id, owner, Pagination::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].email, "o@acme.io");
        assert_eq!(svc.list_for_user(owner).await.unwrap().len(), 1);
    }
}
