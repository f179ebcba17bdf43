//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP inbound adapter maps them
//! to status codes and the `{"error": message}` wire payload; nothing in
//! this module knows about actix.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A uniqueness invariant would be violated (duplicate email,
    /// duplicate response). The upstream API reported these as 400, and
    /// that status is preserved on the wire.
    Conflict,
    /// The caller exceeded a rate limit window.
    TooManyRequests,
    /// An unexpected error occurred inside the domain or a store adapter.
    InternalError,
}

/// Domain error carried from services and stores to the inbound adapters.
///
/// # Examples
/// ```
/// use backend::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::not_found("Survey not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "Survey not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    retry_after: Option<u64>,
}

impl DomainError {
    /// Create a new error with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to clients.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Retry hint in seconds, set only on rate-limit rejections.
    #[must_use]
    pub fn retry_after(&self) -> Option<u64> {
        self.retry_after
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::TooManyRequests`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::DomainError;
    ///
    /// let err = DomainError::too_many_requests("slow down", 900);
    /// assert_eq!(err.retry_after(), Some(900));
    /// ```
    pub fn too_many_requests(message: impl Into<String>, retry_after_seconds: u64) -> Self {
        Self {
            code: ErrorCode::TooManyRequests,
            message: message.into(),
            retry_after: Some(retry_after_seconds),
        }
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DomainError::invalid_request("bad"), ErrorCode::InvalidRequest)]
    #[case(DomainError::unauthorized("no"), ErrorCode::Unauthorized)]
    #[case(DomainError::forbidden("nope"), ErrorCode::Forbidden)]
    #[case(DomainError::not_found("gone"), ErrorCode::NotFound)]
    #[case(DomainError::conflict("dup"), ErrorCode::Conflict)]
    #[case(DomainError::internal("boom"), ErrorCode::InternalError)]
    fn constructors_set_codes(#[case] err: DomainError, #[case] code: ErrorCode) {
        assert_eq!(err.code(), code);
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn rate_limit_errors_carry_retry_hint() {
        let err = DomainError::too_many_requests("later", 900);
        assert_eq!(err.code(), ErrorCode::TooManyRequests);
        assert_eq!(err.retry_after(), Some(900));
        assert_eq!(err.to_string(), "later");
    }
}
