//! JWT access tokens (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::user::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: Uuid,
    pub access_uuid: Uuid,
    pub role: i32,
    pub authorised: bool,
    pub exp: usize,
}

impl Claims {
    pub fn role(&self) -> Option<UserRole> {
        UserRole::try_from(self.role).ok()
    }

    pub fn is_super_admin(&self) -> bool {
        self.role() == Some(UserRole::SuperAdmin)
    }
}

pub fn issue_token(secret: &str, user: &AuthUser, ttl: Duration) -> Result<String, AuthError> {
    let exp = (Utc::now() + ttl).timestamp() as usize;
    let claims = Claims { user_id: user.id, access_uuid: Uuid::new_v4(), role: user.role, authorised: true, exp };
    encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &key, &validation).map_err(|e| AuthError::TokenError(e.to_string()))?;
    if !data.claims.authorised {
        return Err(AuthError::TokenError("token not authorised".into()));
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: "t@example.com".into(), name: "T".into(), role: role.into() }
    }

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let u = user(UserRole::SuperAdmin);
        let tok = issue_token("s3cret", &u, Duration::hours(1)).unwrap();
        let claims = decode_token("s3cret", &tok).unwrap();
        assert_eq!(claims.user_id, u.id);
        assert!(claims.is_super_admin());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let tok = issue_token("a", &user(UserRole::User), Duration::hours(1)).unwrap();
        assert!(decode_token("b", &tok).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // beyond the default 60s leeway
        let tok = issue_token("a", &user(UserRole::User), Duration::minutes(-5)).unwrap();
        assert!(decode_token("a", &tok).is_err());
    }
}
