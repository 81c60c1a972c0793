//! Session-token issuance and validation (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mealbridge_core::{Identity, Role, UserId, UserStatus};

/// Fixed session lifetime.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Claims embedded in every session token.
///
/// Role and status are a snapshot from issuance time; the session resolver
/// re-checks the live directory row on every request, which is what makes a
/// block effective before the token expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — user ID.
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signing key is missing or empty. Callers must treat this as a
    /// startup failure, never fall back to a built-in secret.
    #[error("token signing key is not configured")]
    MissingKey,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Issues and validates signed session tokens.
///
/// Purely cryptographic/structural: no database access. Constructed once at
/// startup and shared.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Build a service from the configured secret. An empty secret is
    /// rejected so a missing configuration value fails closed.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingKey);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(TOKEN_TTL_DAYS),
        })
    }

    #[cfg(test)]
    fn with_ttl(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        let mut service = Self::new(secret)?;
        service.ttl = ttl;
        Ok(service)
    }

    /// Sign a token for an authenticated identity.
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            status: identity.status,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
