//! HTTP mapping for domain errors.
//!
//! Keeps [`DomainError`] transport agnostic while giving actix handlers a
//! consistent `{"error": message}` payload. Conflicts map to 400, not 409:
//! the original API reported duplicate email and duplicate response that
//! way, and clients depend on it.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{DomainError, ErrorCode, StoreError};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, DomainError>;

/// Error payload on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Seconds until the caller may retry; rate-limit rejections only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl From<&DomainError> for ErrorBody {
    fn from(err: &DomainError) -> Self {
        Self {
            error: err.message().to_owned(),
            retry_after: err.retry_after(),
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        // Conflict is 400 on the wire by contract, see module docs.
        ErrorCode::InvalidRequest | ErrorCode::Conflict => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::from(self))
    }
}

/// Log a failed store operation and produce the route's generic 500
/// message. The detail stays in the logs, never on the wire.
pub(crate) fn store_failure(message: &'static str, err: &StoreError) -> DomainError {
    error!(error = %err, "{message}");
    DomainError::internal(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: DomainError) -> (StatusCode, Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[actix_web::test]
    async fn statuses_and_payload_shape() {
        let cases = vec![
            (DomainError::unauthorized("Access denied. No token provided."), 401),
            (DomainError::invalid_request("Invalid token."), 400),
            (
                DomainError::forbidden("Access denied. Insufficient permissions."),
                403,
            ),
            (DomainError::not_found("Survey not found"), 404),
            // Conflicts keep the upstream 400, not 409.
            (DomainError::conflict("User already exists"), 400),
            (DomainError::internal("Registration failed"), 500),
        ];
        for (err, status) in cases {
            let expected = err.message().to_owned();
            let (actual, body) = body_json(err).await;
            assert_eq!(actual.as_u16(), status, "{expected}");
            assert_eq!(body["error"], expected.as_str());
            assert!(body.get("retryAfter").is_none());
        }
    }

    #[actix_web::test]
    async fn rate_limit_rejection_includes_retry_hint() {
        let (status, body) =
            body_json(DomainError::too_many_requests("Too many requests", 900)).await;
        assert_eq!(status.as_u16(), 429);
        assert_eq!(body["retryAfter"], 900);
    }
}
