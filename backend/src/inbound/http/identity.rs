//! Bearer-token identity extraction and role gating.
//!
//! Handlers declare an [`Identity`] parameter to require authentication;
//! extraction runs the per-request state machine
//! `Unauthenticated → TokenInvalid | Authenticated` before the handler
//! body executes. Role gates (`Authenticated → Forbidden | Authorized`)
//! run inside the handler via [`RequireRole::require_role`].
//!
//! Status codes are part of the observed contract: a missing header is
//! 401, while a present-but-invalid token is 400. The distinction between
//! "absent" and "present but bad" credentials is preserved deliberately.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::domain::{DomainError, Identity, Role};
use crate::inbound::http::state::HttpState;

const MISSING_TOKEN: &str = "Access denied. No token provided.";
const INVALID_TOKEN: &str = "Invalid token.";
const INSUFFICIENT_ROLE: &str = "Access denied. Insufficient permissions.";

fn extract_identity(req: &HttpRequest) -> Result<Identity, DomainError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| DomainError::internal("authentication state missing"))?;
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| DomainError::unauthorized(MISSING_TOKEN))?;
    // A present but unreadable or unverifiable credential is 400.
    let token = raw
        .to_str()
        .map_err(|_| DomainError::invalid_request(INVALID_TOKEN))?;
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    // "Bearer " with nothing after it is an absent credential, not a bad
    // one: empty tokens get the 401, same as a missing header.
    if token.is_empty() {
        return Err(DomainError::unauthorized(MISSING_TOKEN));
    }
    state
        .tokens
        .verify(token)
        .map_err(|_| DomainError::invalid_request(INVALID_TOKEN))
}

impl FromRequest for Identity {
    type Error = DomainError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}

/// Role gate applied after authentication.
pub trait RequireRole {
    /// Reject with 403 unless the identity's role is in `allowed`.
    ///
    /// # Errors
    /// Returns [`DomainError::forbidden`] when the role is not permitted.
    fn require_role(&self, allowed: &[Role]) -> Result<(), DomainError>;
}

impl RequireRole for Identity {
    fn require_role(&self, allowed: &[Role]) -> Result<(), DomainError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(DomainError::forbidden(INSUFFICIENT_ROLE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, TokenService};
    use crate::inbound::http::state::{HttpState, StorePorts};
    use crate::outbound::persistence::MemoryStore;
    use actix_web::test::TestRequest;
    use std::sync::Arc;

    fn test_state(secret: &str) -> web::Data<HttpState> {
        let store = Arc::new(MemoryStore::new());
        web::Data::new(HttpState::new(
            StorePorts {
                users: store.clone(),
                surveys: store.clone(),
                responses: store,
            },
            TokenService::new(secret),
        ))
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let req = TestRequest::default()
            .app_data(test_state("secret"))
            .to_http_request();
        let err = extract_identity(&req).expect_err("no header");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), MISSING_TOKEN);
    }

    #[actix_web::test]
    async fn garbage_token_is_invalid_request_not_unauthorized() {
        let req = TestRequest::default()
            .app_data(test_state("secret"))
            .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
            .to_http_request();
        let err = extract_identity(&req).expect_err("bad token");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), INVALID_TOKEN);
    }

    #[actix_web::test]
    async fn empty_token_counts_as_missing() {
        for value in ["Bearer ", ""] {
            let req = TestRequest::default()
                .app_data(test_state("secret"))
                .insert_header((header::AUTHORIZATION, value))
                .to_http_request();
            let err = extract_identity(&req).expect_err("empty token");
            assert_eq!(err.code(), ErrorCode::Unauthorized);
            assert_eq!(err.message(), MISSING_TOKEN);
        }
    }

    #[actix_web::test]
    async fn valid_token_yields_identity() {
        let state = test_state("secret");
        let token = state
            .tokens
            .issue("u-1", "a@b.c", Role::Company)
            .expect("issue");
        let req = TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request();
        let identity = extract_identity(&req).expect("identity");
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.role, Role::Company);
    }

    #[test]
    fn role_gate_allows_and_forbids() {
        let identity = Identity {
            user_id: "u-1".into(),
            email: "a@b.c".into(),
            role: Role::Merchant,
        };
        assert!(identity
            .require_role(&[Role::Merchant, Role::Admin])
            .is_ok());
        let err = identity
            .require_role(&[Role::Admin, Role::Company])
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), INSUFFICIENT_ROLE);
    }
}
