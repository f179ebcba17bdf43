//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `{uid, email, role, iat, exp}` with a
//! fixed 24-hour lifetime. There is no refresh mechanism: an expired
//! token requires a fresh login.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Role;

/// Fixed token lifetime.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Errors surfaced by the token service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature invalid, token malformed, or token expired. Callers
    /// cannot distinguish the three; the client must log in again.
    #[error("invalid token")]
    Invalid,
    /// The signing operation itself failed.
    #[error("token signing failed: {message}")]
    Signing { message: String },
}

/// JWT claim set on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id; the contract names this claim `uid`.
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Verified caller identity attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.uid,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Issues and verifies signed identity tokens. Cheap to clone; handlers
/// share one instance via the HTTP state.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<Inner>,
}

struct Inner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    /// Build a service signing with `secret` and the standard 24-hour
    /// lifetime.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self::with_lifetime(secret, Duration::hours(TOKEN_LIFETIME_HOURS))
    }

    /// Build a service with an explicit lifetime. Used by tests to mint
    /// already-expired tokens.
    #[must_use]
    pub fn with_lifetime(secret: &str, lifetime: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                lifetime,
            }),
        }
    }

    /// Produce a signed token embedding the caller's id, email and role.
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] when the JWT library fails to sign,
    /// which indicates a configuration problem rather than bad input.
    pub fn issue(&self, user_id: &str, email: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            uid: user_id.to_owned(),
            email: email.to_owned(),
            role,
            iat: now.timestamp(),
            exp: (now + self.inner.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding).map_err(|e| {
            TokenError::Signing {
                message: e.to_string(),
            }
        })
    }

    /// Verify a token and recover the caller identity.
    ///
    /// # Errors
    /// Returns [`TokenError::Invalid`] when the signature does not match,
    /// the token is malformed, or `exp` has passed.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.inner.decoding, &validation)
            .map(|data| Identity::from(data.claims))
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SECRET: &str = "unit-test-secret";

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Merchant)]
    #[case(Role::Company)]
    fn issue_then_verify_round_trips_identity(#[case] role: Role) {
        let service = TokenService::new(SECRET);
        let token = service.issue("user-1", "user@example.com", role).expect("issue");
        let identity = service.verify(&token).expect("verify");
        assert_eq!(
            identity,
            Identity {
                user_id: "user-1".into(),
                email: "user@example.com".into(),
                role,
            }
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        // jsonwebtoken applies 60 seconds of leeway, so expire well past it.
        let service = TokenService::with_lifetime(SECRET, Duration::minutes(-5));
        let token = service
            .issue("user-1", "user@example.com", Role::Merchant)
            .expect("issue");
        assert_eq!(service.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let issuer = TokenService::new("other-secret");
        let token = issuer
            .issue("user-1", "user@example.com", Role::Admin)
            .expect("issue");
        assert_eq!(
            TokenService::new(SECRET).verify(&token),
            Err(TokenError::Invalid)
        );
    }

    #[rstest]
    #[case("")]
    #[case("not-a-jwt")]
    #[case("aaaa.bbbb.cccc")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        assert_eq!(
            TokenService::new(SECRET).verify(token),
            Err(TokenError::Invalid)
        );
    }
}
