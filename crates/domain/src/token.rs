//! Signed, short-lived access tokens for module dashboards.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user (or client) the token was minted for.
    pub sub: String,

    /// Schema or module name the token grants access to.
    pub schema: String,

    /// Issued-at, seconds since epoch.
    pub iat: i64,

    /// Absolute expiry, seconds since epoch.
    pub exp: i64,
}

/// Errors from minting or verifying access tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is invalid: {0}")]
    Invalid(String),

    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// Mints and verifies HS256 access tokens.
///
/// Validity is solely time- and signature-based; there is no revocation
/// list, and tokens are never persisted.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl AccessTokenIssuer {
    /// Creates an issuer with the default one-hour lifetime.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, DEFAULT_TOKEN_TTL_SECS)
    }

    /// Creates an issuer with a custom lifetime in seconds.
    pub fn with_ttl(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Mints a compact signed token embedding subject and schema, expiring
    /// exactly `ttl_secs` after the issue instant.
    pub fn mint(&self, subject: &str, schema: &str) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: subject.to_string(),
            schema: schema.to_string(),
            iat,
            exp: iat + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Encode(err.to_string()))
    }

    /// Verifies a token's signature and expiry (zero leeway) and returns
    /// its claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Invalid(err.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-secret";

    #[test]
    fn minted_token_roundtrips() {
        let issuer = AccessTokenIssuer::new(SECRET);
        let token = issuer.mint("user-42", "pos").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.schema, "pos");
    }

    #[test]
    fn expiry_is_exactly_ttl_after_issue() {
        let issuer = AccessTokenIssuer::new(SECRET);
        let token = issuer.mint("user-42", "pos").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = AccessTokenIssuer::new(SECRET);
        let other = AccessTokenIssuer::new(b"another-secret");

        let token = issuer.mint("user-42", "pos").unwrap();
        assert!(matches!(
            other.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = AccessTokenIssuer::with_ttl(SECRET, -10);
        let token = issuer.mint("user-42", "pos").unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = AccessTokenIssuer::new(SECRET);
        assert!(issuer.verify("not-a-token").is_err());
    }
}
