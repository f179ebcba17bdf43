//! Durable store adapter backed by the Firestore REST document API.
//!
//! Three logical collections hold the persisted state: `users`, `surveys`
//! and `responses`, keyed by store-assigned UUIDs. Plain equality lookups
//! run server-side through `:runQuery`; listings that would need a
//! composite index (per-company or active-only, ordered by recency) fetch
//! the collection and filter/sort in process instead. That trades read
//! efficiency for zero index provisioning and is intentional.

mod client;
pub mod value;

pub use client::{Document, FirestoreClient, FirestoreConfig};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::domain::{
    NewResponse, NewSurvey, NewUser, ResponseStore, StoreError, StoreResult, Survey,
    SurveyResponse, SurveyStore, SurveyUpdate, User, UserStore,
};

const USERS: &str = "users";
const SURVEYS: &str = "surveys";
const RESPONSES: &str = "responses";

/// Firestore-backed implementation of all three store ports.
pub struct FirestoreStore {
    client: FirestoreClient,
}

impl FirestoreStore {
    /// Connect to the configured project or emulator.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the HTTP client cannot be
    /// built.
    pub fn new(config: &FirestoreConfig) -> StoreResult<Self> {
        Ok(Self {
            client: FirestoreClient::new(config)?,
        })
    }
}

/// Serialise a domain record into Firestore fields, dropping `id`: the
/// document id carries it.
fn encode<T: Serialize>(record: &T) -> StoreResult<Map<String, Value>> {
    let json = serde_json::to_value(record)
        .map_err(|e| StoreError::serialization(format!("encode: {e}")))?;
    let Value::Object(mut obj) = json else {
        return Err(StoreError::serialization("record is not a JSON object"));
    };
    obj.remove("id");
    value::to_fields(&obj)
}

/// Decode a document back into a domain record, reinstating `id` from the
/// document name.
fn decode<T: DeserializeOwned>(doc: &Document) -> StoreResult<T> {
    let mut obj = value::from_fields(&doc.fields)?;
    obj.insert("id".to_owned(), Value::String(doc.id().to_owned()));
    serde_json::from_value(Value::Object(obj))
        .map_err(|e| StoreError::serialization(format!("decode: {e}")))
}

fn string_filter(value: &str) -> Value {
    json!({ "stringValue": value })
}

#[async_trait]
impl UserStore for FirestoreStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let record = User {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            phone: user.phone,
            role: user.role,
            created_at: Utc::now(),
        };
        self.client
            .create_document(USERS, &record.id, encode(&record)?)
            .await?;
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let docs = self
            .client
            .run_query(USERS, &[("email", string_filter(email))])
            .await?;
        docs.first().map(decode).transpose()
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.client
            .get_document(USERS, id)
            .await?
            .as_ref()
            .map(decode)
            .transpose()
    }
}

#[async_trait]
impl SurveyStore for FirestoreStore {
    async fn create(&self, survey: NewSurvey) -> StoreResult<Survey> {
        let now = Utc::now();
        let record = Survey {
            id: Uuid::new_v4().to_string(),
            title: survey.title,
            description: survey.description,
            questions: survey.questions,
            company_id: survey.company_id,
            is_active: survey.is_active,
            created_at: now,
            updated_at: now,
        };
        self.client
            .create_document(SURVEYS, &record.id, encode(&record)?)
            .await?;
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Survey>> {
        self.client
            .get_document(SURVEYS, id)
            .await?
            .as_ref()
            .map(decode)
            .transpose()
    }

    async fn list_by_company(&self, company_id: &str) -> StoreResult<Vec<Survey>> {
        // companyId filter plus createdAt ordering would need a composite
        // index; fetch and filter in process instead.
        let docs = self.client.list_documents(SURVEYS).await?;
        let mut surveys: Vec<Survey> = docs
            .iter()
            .map(decode::<Survey>)
            .collect::<StoreResult<Vec<_>>>()?
            .into_iter()
            .filter(|s| s.company_id == company_id)
            .collect();
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(surveys)
    }

    async fn list_active(&self) -> StoreResult<Vec<Survey>> {
        let docs = self.client.list_documents(SURVEYS).await?;
        let mut surveys: Vec<Survey> = docs
            .iter()
            .map(decode::<Survey>)
            .collect::<StoreResult<Vec<_>>>()?
            .into_iter()
            .filter(|s| s.is_active)
            .collect();
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(surveys)
    }

    async fn update(&self, id: &str, update: SurveyUpdate) -> StoreResult<Option<Survey>> {
        let questions = serde_json::to_value(&update.questions)
            .map_err(|e| StoreError::serialization(format!("encode questions: {e}")))?;
        let patch = json!({
            "title": update.title,
            "description": update.description,
            "questions": questions,
            "isActive": update.is_active,
            "updatedAt": Utc::now(),
        });
        let Value::Object(obj) = patch else {
            return Err(StoreError::serialization("patch is not a JSON object"));
        };
        let fields = value::to_fields(&obj)?;
        let mask = ["title", "description", "questions", "isActive", "updatedAt"];
        self.client
            .patch_document(SURVEYS, id, fields, &mask)
            .await?
            .as_ref()
            .map(decode)
            .transpose()
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        // Firestore deletes are idempotent, so check existence to report
        // whether anything was removed.
        if self.client.get_document(SURVEYS, id).await?.is_none() {
            return Ok(false);
        }
        self.client.delete_document(SURVEYS, id).await?;
        Ok(true)
    }
}

#[async_trait]
impl ResponseStore for FirestoreStore {
    async fn create(&self, response: NewResponse) -> StoreResult<SurveyResponse> {
        let record = SurveyResponse {
            id: Uuid::new_v4().to_string(),
            survey_id: response.survey_id,
            merchant_id: response.merchant_id,
            answers: response.answers,
            submitted_at: Utc::now(),
        };
        self.client
            .create_document(RESPONSES, &record.id, encode(&record)?)
            .await?;
        Ok(record)
    }

    async fn list_by_survey(&self, survey_id: &str) -> StoreResult<Vec<SurveyResponse>> {
        let docs = self
            .client
            .run_query(RESPONSES, &[("surveyId", string_filter(survey_id))])
            .await?;
        let mut responses: Vec<SurveyResponse> = docs
            .iter()
            .map(decode)
            .collect::<StoreResult<Vec<_>>>()?;
        // Server-side ordering would need a composite index on top of the
        // equality filter; sort here instead.
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(responses)
    }

    async fn list_by_merchant(&self, merchant_id: &str) -> StoreResult<Vec<SurveyResponse>> {
        let docs = self
            .client
            .run_query(RESPONSES, &[("merchantId", string_filter(merchant_id))])
            .await?;
        let mut responses: Vec<SurveyResponse> = docs
            .iter()
            .map(decode)
            .collect::<StoreResult<Vec<_>>>()?;
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(responses)
    }

    async fn exists_for(&self, survey_id: &str, merchant_id: &str) -> StoreResult<bool> {
        let docs = self
            .client
            .run_query(
                RESPONSES,
                &[
                    ("surveyId", string_filter(survey_id)),
                    ("merchantId", string_filter(merchant_id)),
                ],
            )
            .await?;
        Ok(!docs.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn encode_drops_id_and_decode_reinstates_it() {
        let user = User {
            id: "u-1".into(),
            email: "a@b.c".into(),
            password_hash: "$2b$10$hash".into(),
            name: "Ada".into(),
            phone: "0600000000".into(),
            role: Role::Merchant,
            created_at: Utc::now(),
        };
        let fields = encode(&user).expect("encode");
        assert!(!fields.contains_key("id"));
        assert!(fields.contains_key("passwordHash"));

        let doc = Document {
            name: "projects/p/databases/(default)/documents/users/u-1".into(),
            fields,
        };
        let decoded: User = decode(&doc).expect("decode");
        assert_eq!(decoded, user);
    }

    #[test]
    fn survey_with_questions_round_trips() {
        let survey = Survey {
            id: "s-1".into(),
            title: "T".into(),
            description: "D".into(),
            questions: vec![crate::domain::Question {
                id: "q1".into(),
                kind: crate::domain::QuestionKind::Checkbox,
                question: "Days open?".into(),
                required: true,
                options: vec!["mon".into(), "tue".into()],
            }],
            company_id: "c-1".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let doc = Document {
            name: "projects/p/databases/(default)/documents/surveys/s-1".into(),
            fields: encode(&survey).expect("encode"),
        };
        let decoded: Survey = decode(&doc).expect("decode");
        assert_eq!(decoded, survey);
    }
}
