//! Store ports implemented by the persistence adapters.
//!
//! Each entity gets its own trait so handlers depend only on the
//! operations they use. The two adapters (Firestore and in-memory) expose
//! behaviourally equivalent operations: same inputs, same logical result
//! shape, same ordering guarantees. Callers never branch on which backend
//! is active; selection happens once at startup.

use async_trait::async_trait;
use thiserror::Error;

use super::response::{NewResponse, SurveyResponse};
use super::survey::{NewSurvey, Survey, SurveyUpdate};
use super::user::{NewUser, User};

/// Errors surfaced by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend connectivity or request failure.
    #[error("store backend failure: {message}")]
    Backend { message: String },
    /// A stored document could not be decoded into the domain shape.
    #[error("store serialisation failure: {message}")]
    Serialization { message: String },
}

impl StoreError {
    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Helper for encode/decode failures.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store: user persistence and lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user; the store assigns the id and creation time.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Look a user up by exact (case-sensitive) email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Look a user up by id.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;
}

/// Survey store.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Persist a new survey; the store assigns id and timestamps.
    async fn create(&self, survey: NewSurvey) -> StoreResult<Survey>;

    /// Look a survey up by id.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Survey>>;

    /// Surveys owned by `company_id`, newest first.
    async fn list_by_company(&self, company_id: &str) -> StoreResult<Vec<Survey>>;

    /// Active surveys across all companies, newest first.
    async fn list_active(&self) -> StoreResult<Vec<Survey>>;

    /// Replace the mutable fields and bump `updated_at`. Returns `None`
    /// when no survey has this id.
    async fn update(&self, id: &str, update: SurveyUpdate) -> StoreResult<Option<Survey>>;

    /// Delete by id; `true` when a survey was removed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

/// Response store.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Persist a new response; the store assigns id and submission time.
    async fn create(&self, response: NewResponse) -> StoreResult<SurveyResponse>;

    /// Responses to `survey_id`, newest first.
    async fn list_by_survey(&self, survey_id: &str) -> StoreResult<Vec<SurveyResponse>>;

    /// Responses submitted by `merchant_id`, newest first.
    async fn list_by_merchant(&self, merchant_id: &str) -> StoreResult<Vec<SurveyResponse>>;

    /// Whether `merchant_id` already responded to `survey_id`.
    async fn exists_for(&self, survey_id: &str, merchant_id: &str) -> StoreResult<bool>;
}
