//! Request extractors: verified token claims, role gate, JSON body with envelope errors.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use service::auth::token::Claims;

use crate::errors::ApiError;

pub const TOKEN_MISSING: &str = "Token could not be found!";
pub const TOKEN_INVALID: &str = "Token is invalid!";
pub const ROLE_NOT_AUTHORIZED: &str = "role not authorized!";

/// Claims put into request extensions by the bearer-token middleware.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| ApiError::unauthorized(TOKEN_MISSING))
    }
}

/// Same as [`AuthClaims`] but only for super admins.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub Claims);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthClaims(claims) = AuthClaims::from_request_parts(parts, state).await?;
        if !claims.is_super_admin() {
            tracing::warn!(user_id = %claims.user_id, role = claims.role, "role_rejected");
            return Err(ApiError::unauthorized(ROLE_NOT_AUTHORIZED));
        }
        Ok(SuperAdmin(claims))
    }
}

/// `axum::Json` with rejections rendered as the error envelope.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(v)) => Ok(JsonBody(v)),
            Err(rej) => {
                let mut e = ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body");
                e.error = Some(serde_json::Value::String(rej.body_text()));
                Err(e)
            }
        }
    }
}
