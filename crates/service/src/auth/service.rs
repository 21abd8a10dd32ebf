use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use models::user::{self, UserRole};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};
use uuid::Uuid;

use super::domain::{RegisterInput, LoginInput, ChangePasswordInput, AuthUser, AuthSession};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, password_algorithm: "argon2".into(), token_ttl_hours: 24 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password and issue a token.
    ///
    /// Emails are trimmed and lowercased before the duplicate check.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { name: Some("Test".into()), email: "User@Example.com".into(), password: "Secret123".into(), ..Default::default() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        self.register_with_role(input, UserRole::User).await
    }

    /// Same as [`register`](Self::register) with an explicit role (used for seeding super admins).
    pub async fn register_with_role(&self, input: RegisterInput, role: UserRole) -> Result<AuthSession, AuthError> {
        let email = user::normalize_email(&input.email);
        user::validate_email(&email).map_err(|_| AuthError::Validation("invalid email".into()))?;
        let name = input.display_name();
        user::validate_name(&name).map_err(|e| AuthError::Validation(e.to_string()))?;
        validate_password(&input.password)?;

        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        // 先哈希再落库，用户与凭据同一次写入
        let hash = hash_password(&input.password)?;
        let user = self
            .repo
            .create_user_with_password(&email, &name, role, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user.id, email = %user.email, role = user.role, "user_registered");

        let token = self.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Authenticate a user and optionally issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { name: Some("N".into()), email: "u@e.com".into(), password: "Passw0rd".into(), ..Default::default() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = user::normalize_email(&input.email);
        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Replace the password after verifying the old one.
    #[instrument(skip(self, input))]
    pub async fn change_password(&self, user_id: Uuid, input: ChangePasswordInput) -> Result<(), AuthError> {
        validate_password(&input.new_password)?;
        let cred = self.repo.get_credentials(user_id).await?.ok_or(AuthError::NotFound)?;
        if !verify_password(&input.old_password, &cred.password_hash)? {
            return Err(AuthError::WrongPassword);
        }
        if input.old_password == input.new_password {
            return Err(AuthError::SamePassword);
        }
        let hash = hash_password(&input.new_password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(%user_id, "password_changed");
        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::NotFound)
    }

    fn issue(&self, user: &AuthUser) -> Result<Option<String>, AuthError> {
        match &self.cfg.jwt_secret {
            Some(secret) => Ok(Some(token::issue_token(secret, user, chrono::Duration::hours(self.cfg.token_ttl_hours))?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("test".into()), ..AuthConfig::default() });
        (repo, svc)
    }

    fn input(email: &str) -> RegisterInput {
        RegisterInput { first_name: Some("Jane".into()), last_name: Some("Doe".into()), email: email.into(), password: "Passw0rd!".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_second_row() {
        let (repo, svc) = svc();
        svc.register(input("jane@example.com")).await.unwrap();
        let err = svc.register(input("  JANE@example.com ")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
        assert_eq!(err.to_string(), "user already exists with the given email");
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn register_issues_token_with_user_role() {
        let (_, svc) = svc();
        let session = svc.register(input("t@example.com")).await.unwrap();
        let claims = token::decode_token("test", session.token.as_deref().unwrap()).unwrap();
        assert_eq!(claims.user_id, session.user.id);
        assert_eq!(claims.role, 1);
        assert_eq!(session.user.name, "Jane Doe");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let (_, svc) = svc();
        svc.register(input("w@example.com")).await.unwrap();
        let err = svc.login(LoginInput { email: "w@example.com".into(), password: "nope-nope".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[tokio::test]
    async fn invalid_email_and_short_password_rejected() {
        let (_, svc) = svc();
        assert!(matches!(svc.register(input("not-an-email")).await, Err(AuthError::Validation(_))));
        let mut short = input("s@example.com");
        short.password = "short".into();
        assert!(matches!(svc.register(short).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let (_, svc) = svc();
        let s = svc.register(input("c@example.com")).await.unwrap();
        let bad = ChangePasswordInput { old_password: "wrong-old".into(), new_password: "NewPassw0rd".into() };
        assert!(matches!(svc.change_password(s.user.id, bad).await, Err(AuthError::WrongPassword)));
        let ok = ChangePasswordInput { old_password: "Passw0rd!".into(), new_password: "NewPassw0rd".into() };
        svc.change_password(s.user.id, ok).await.unwrap();
        assert!(svc.login(LoginInput { email: "c@example.com".into(), password: "NewPassw0rd".into() }).await.is_ok());
    }

    #[tokio::test]
    async fn reusing_current_password_is_rejected() {
        let (_, svc) = svc();
        let s = svc.register(input("same@example.com")).await.unwrap();
        let same = ChangePasswordInput { old_password: "Passw0rd!".into(), new_password: "Passw0rd!".into() };
        let err = svc.change_password(s.user.id, same).await.unwrap_err();
        assert!(matches!(err, AuthError::SamePassword));
        assert_eq!(err.to_string(), "new password cannot be the same as the old password");
    }

    #[tokio::test]
    async fn failed_credentials_write_leaves_no_user_behind() {
        let (repo, svc) = svc();
        repo.fail_credential_writes(true);
        assert!(matches!(svc.register(input("half@example.com")).await, Err(AuthError::Repository(_))));
        assert_eq!(repo.user_count(), 0);

        repo.fail_credential_writes(false);
        let session = svc.register(input("half@example.com")).await.unwrap();
        assert!(svc.login(LoginInput { email: "half@example.com".into(), password: "Passw0rd!".into() }).await.is_ok());
        assert_eq!(session.user.email, "half@example.com");
    }
}
