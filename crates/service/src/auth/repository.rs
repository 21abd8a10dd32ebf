use async_trait::async_trait;
use models::user::UserRole;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    /// Insert the user row and its credentials together; neither is kept if either write fails.
    async fn create_user_with_password(
        &self,
        email: &str,
        name: &str,
        role: UserRole,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: normalized email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
        fail_credential_writes: AtomicBool,
    }

    impl MockAuthRepository {
        pub fn user_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        /// Make credential writes fail with a repository error until switched off.
        pub fn fail_credential_writes(&self, on: bool) {
            self.fail_credential_writes.store(on, Ordering::SeqCst);
        }

        fn credential_write_guard(&self) -> Result<(), AuthError> {
            if self.fail_credential_writes.load(Ordering::SeqCst) {
                return Err(AuthError::Repository("credentials write failed".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user_with_password(
            &self,
            email: &str,
            name: &str,
            role: UserRole,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            // 凭据写失败时用户行也不落地
            self.credential_write_guard()?;
            let user = AuthUser { id: Uuid::new_v4(), email: email.to_string(), name: name.to_string(), role: role.into() };
            self.creds
                .lock()
                .unwrap()
                .insert(user.id, Credentials { user_id: user.id, password_hash, password_algorithm });
            users.insert(email.to_string(), user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            self.credential_write_guard()?;
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
