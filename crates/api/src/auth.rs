//! Bearer-token authentication.
//!
//! The core trusts the verified `(user, role)` identity unconditionally;
//! this module is the boundary that produces it. User registration and
//! login live outside this service — callers arrive with an HS256 token
//! signed with the shared secret.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use common::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Lifetime of an auth token issued by [`Authenticator::issue`].
const AUTH_TOKEN_TTL_HOURS: i64 = 24;

/// Role attached to an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaims {
    sub: String,
    role: Role,
    exp: i64,
}

/// Verifies (and, for tooling and tests, issues) auth tokens.
#[derive(Clone)]
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Authenticator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issues a token for a user. Used by tests and operational tooling;
    /// the production login flow lives in a separate service.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, ApiError> {
        let claims = AuthClaims {
            sub: user_id.to_string(),
            role,
            exp: (Utc::now() + Duration::hours(AUTH_TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| ApiError::Internal(format!("failed to issue token: {err}")))
    }

    /// Verifies a bearer token and extracts the identity.
    pub fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let data = decode::<AuthClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| ApiError::Unauthorized(format!("invalid token: {err}")))?;

        let id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ApiError::Unauthorized("invalid token subject".to_string()))?;

        Ok(AuthUser {
            id,
            role: data.claims.role,
        })
    }
}

/// A verified identity extracted from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: UserId,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = parts
            .extensions
            .get::<Arc<Authenticator>>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("authenticator not configured".to_string()))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        authenticator.verify(token)
    }
}

/// An [`AuthUser`] that is additionally required to be an admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let auth = Authenticator::new(b"secret");
        let user_id = UserId::new();

        let token = auth.issue(user_id, Role::User).unwrap();
        let user = auth.verify(&token).unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let auth = Authenticator::new(b"secret");
        let other = Authenticator::new(b"other-secret");

        let token = auth.issue(UserId::new(), Role::Admin).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn admin_role_roundtrips() {
        let auth = Authenticator::new(b"secret");
        let token = auth.issue(UserId::new(), Role::Admin).unwrap();
        assert!(auth.verify(&token).unwrap().is_admin());
    }
}
