use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use models::{invitation, user};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, instrument};
use uuid::Uuid;

use super::repository::InvitationRepository;
use super::token::{build_link, extract_token, generate_token};
use crate::errors::ServiceError;
use crate::organisation::{ensure_owner, repository::OrganisationRepository};
use crate::pagination::{Page, Pagination};

pub const INVALID_LINK_FORMAT: &str = "Invalid invitation link format";
pub const UNKNOWN_LINK: &str = "Invalid or expired invitation link";
pub const EXPIRED_LINK: &str = "Expired Invitation Link";
pub const USED_LINK: &str = "Invitation Link already used";

#[derive(Clone, Debug)]
pub struct InvitationConfig {
    pub base_url: String,
    pub ttl_hours: i64,
    pub max_invites_per_request: usize,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8019".into(), ttl_hours: 24, max_invites_per_request: 5 }
    }
}

impl From<&configs::AppSection> for InvitationConfig {
    fn from(app: &configs::AppSection) -> Self {
        Self {
            base_url: app.base_url.clone(),
            ttl_hours: app.invitation_ttl_hours,
            max_invites_per_request: app.max_invites_per_request,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateInvitation {
    pub email: String,
    pub org_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SendInvites {
    #[serde(default)]
    pub emails: Vec<String>,
    pub org_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SentInvitation {
    pub email: String,
    pub invitation_link: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchResult {
    pub invitations: Vec<SentInvitation>,
    pub invalid_emails: Vec<String>,
}

pub struct InvitationService {
    invites: Arc<dyn InvitationRepository>,
    orgs: Arc<dyn OrganisationRepository>,
    cfg: InvitationConfig,
}

impl InvitationService {
    pub fn new(invites: Arc<dyn InvitationRepository>, orgs: Arc<dyn OrganisationRepository>, cfg: InvitationConfig) -> Self {
        Self { invites, orgs, cfg }
    }

    pub fn config(&self) -> &InvitationConfig { &self.cfg }

    async fn issue(&self, org_id: Uuid, inviter_id: Uuid, email: &str) -> Result<SentInvitation, ServiceError> {
        let token = generate_token();
        let inv = invitation::new_model(org_id, inviter_id, email, &token, Duration::hours(self.cfg.ttl_hours))?;
        let inv = self.invites.insert(inv).await?;
        info!(invitation_id = %inv.id, %org_id, email = %inv.email, "invitation_created");
        Ok(SentInvitation { email: inv.email, invitation_link: build_link(&self.cfg.base_url, &token) })
    }

    /// Issue one invitation link. Only the organisation owner may invite.
    ///
    /// # Examples
    /// ```
    /// use service::invitation::{InvitationService, InvitationConfig, CreateInvitation, repository::mock::MockInvitationRepository};
    /// use service::organisation::{OrganisationService, repository::mock::MockOrganisationRepository};
    /// use models::organisation::NewOrganisation;
    /// use std::sync::Arc;
    /// let orgs = Arc::new(MockOrganisationRepository::default());
    /// let owner = uuid::Uuid::new_v4();
    /// let org = tokio_test::block_on(OrganisationService::new(orgs.clone())
    ///     .create(owner, NewOrganisation { name: "acme".into(), email: "a@acme.io".into(), ..Default::default() }))
    ///     .unwrap();
    /// let svc = InvitationService::new(Arc::new(MockInvitationRepository::default()), orgs, InvitationConfig::default());
    /// let sent = tokio_test::block_on(svc.create(owner, CreateInvitation { email: "Guest@Example.com".into(), org_id: org.id.to_string() })).unwrap();
    /// assert!(sent.invitation_link.starts_with("http://localhost:8019/invite/accept/"));
    /// ```
    #[instrument(skip(self, input), fields(org_id = %input.org_id))]
    pub async fn create(&self, inviter_id: Uuid, input: CreateInvitation) -> Result<SentInvitation, ServiceError> {
        let email = user::normalize_email(&input.email);
        if user::validate_email(&email).is_err() {
            return Err(ServiceError::BadRequest("Invalid email format".into()));
        }
        let org_id = Uuid::parse_str(input.org_id.trim())
            .map_err(|_| ServiceError::Unprocessable("Invalid Organisation ID".into()))?;
        // 此处 "admin" 即 owner
        match ensure_owner(self.orgs.as_ref(), org_id, inviter_id).await {
            Ok(_) => {}
            Err(ServiceError::NotFound(_)) => return Err(ServiceError::NotFound("Invalid Organisation ID".into())),
            Err(ServiceError::Forbidden(_)) => {
                return Err(ServiceError::Forbidden("User is not an admin of the organisation".into()))
            }
            Err(e) => return Err(e),
        }
        self.issue(org_id, inviter_id, &email).await
    }

    /// Issue invitations for several addresses at once; invalid addresses are reported, not fatal.
    #[instrument(skip(self, input), fields(org_id = %input.org_id, count = input.emails.len()))]
    pub async fn send_batch(&self, inviter_id: Uuid, input: SendInvites) -> Result<BatchResult, ServiceError> {
        if input.emails.is_empty() {
            return Err(ServiceError::BadRequest("emails list cannot be empty".into()));
        }
        if input.emails.len() > self.cfg.max_invites_per_request {
            return Err(ServiceError::TooLarge("Payload too large; email limit exceeded".into()));
        }
        let normalized: Vec<String> = input.emails.iter().map(|e| user::normalize_email(e)).collect();
        let unique = normalized.iter().map(String::as_str).collect::<HashSet<_>>().len();
        if unique != normalized.len() {
            return Err(ServiceError::Conflict("Duplicate emails found".into()));
        }
        let org_id = Uuid::parse_str(input.org_id.trim())
            .map_err(|_| ServiceError::Unprocessable("Invalid Organisation ID".into()))?;
        if self.orgs.find(org_id).await?.is_none() {
            return Err(ServiceError::NotFound("organisation not found".into()));
        }
        if !self.orgs.is_member(inviter_id, org_id).await? {
            return Err(ServiceError::Forbidden("User not a member of the organization".into()));
        }

        let mut out = BatchResult { invitations: Vec::new(), invalid_emails: Vec::new() };
        for (raw, email) in input.emails.iter().zip(normalized) {
            if user::validate_email(&email).is_err() {
                warn!(email = %raw, "invite_skipped_invalid_email");
                out.invalid_emails.push(raw.clone());
                continue;
            }
            out.invitations.push(self.issue(org_id, inviter_id, &email).await?);
        }
        Ok(out)
    }

    /// Redeem an invitation link for `user_id`; returns the joined organisation id.
    ///
    /// Checks run in order: link format, unknown token, expiry, already used.
    #[instrument(skip(self, link))]
    pub async fn accept(&self, user_id: Uuid, link: &str) -> Result<Uuid, ServiceError> {
        let token = extract_token(link).ok_or_else(|| ServiceError::BadRequest(INVALID_LINK_FORMAT.into()))?;
        let inv = self
            .invites
            .find_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::BadRequest(UNKNOWN_LINK.into()))?;
        if inv.is_expired_at(Utc::now().into()) {
            return Err(ServiceError::BadRequest(EXPIRED_LINK.into()));
        }
        if !inv.is_valid {
            return Err(ServiceError::BadRequest(USED_LINK.into()));
        }
        if self.orgs.find(inv.organisation_id).await?.is_none() {
            return Err(ServiceError::NotFound("Organization not found".into()));
        }
        // 条件更新 + 入组在同一个单元内：并发请求中只有一个能成功
        if !self.invites.redeem(token, user_id, inv.organisation_id).await? {
            return Err(ServiceError::BadRequest(USED_LINK.into()));
        }
        info!(invitation_id = %inv.id, org_id = %inv.organisation_id, %user_id, "invitation_accepted");
        Ok(inv.organisation_id)
    }

    /// Invalidate an outstanding link. Only the organisation owner may do this.
    #[instrument(skip(self, link))]
    pub async fn deactivate(&self, user_id: Uuid, link: &str) -> Result<(), ServiceError> {
        let token = extract_token(link).ok_or_else(|| ServiceError::BadRequest(INVALID_LINK_FORMAT.into()))?;
        let inv = self
            .invites
            .find_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::not_found("invitation"))?;
        ensure_owner(self.orgs.as_ref(), inv.organisation_id, user_id).await?;
        self.invites.consume(token).await?;
        info!(invitation_id = %inv.id, "invitation_deactivated");
        Ok(())
    }

    pub async fn list(&self, page: Pagination) -> Result<Page<invitation::Model>, ServiceError> {
        self.invites.list(page).await
    }
}
