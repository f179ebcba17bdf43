//! Process-local store adapter.
//!
//! Backs the three store ports with plain vectors behind a `RwLock`.
//! Nothing survives a restart; this adapter is selected only when the
//! Firestore configuration is absent or fails to initialise, and is the
//! backend the test suites run against.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    NewResponse, NewSurvey, NewUser, ResponseStore, StoreResult, Survey, SurveyResponse,
    SurveyStore, SurveyUpdate, User, UserStore,
};
use std::sync::RwLock;

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    surveys: Vec<Survey>,
    responses: Vec<SurveyResponse>,
}

/// In-memory implementation of all three store ports.
///
/// A single instance is shared behind `Arc` so the user, survey and
/// response collections live together, mirroring one logical database.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> T {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Collections) -> T) -> T {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

fn assign_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let record = User {
            id: assign_id(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            phone: user.phone,
            role: user.role,
            created_at: Utc::now(),
        };
        self.write(|c| c.users.push(record.clone()));
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.read(|c| c.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.read(|c| c.users.iter().find(|u| u.id == id).cloned()))
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn create(&self, survey: NewSurvey) -> StoreResult<Survey> {
        let now = Utc::now();
        let record = Survey {
            id: assign_id(),
            title: survey.title,
            description: survey.description,
            questions: survey.questions,
            company_id: survey.company_id,
            is_active: survey.is_active,
            created_at: now,
            updated_at: now,
        };
        self.write(|c| c.surveys.push(record.clone()));
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Survey>> {
        Ok(self.read(|c| c.surveys.iter().find(|s| s.id == id).cloned()))
    }

    async fn list_by_company(&self, company_id: &str) -> StoreResult<Vec<Survey>> {
        let mut surveys: Vec<Survey> = self.read(|c| {
            c.surveys
                .iter()
                .filter(|s| s.company_id == company_id)
                .cloned()
                .collect()
        });
        // Stable sort keeps insertion order for equal timestamps.
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(surveys)
    }

    async fn list_active(&self) -> StoreResult<Vec<Survey>> {
        let mut surveys: Vec<Survey> = self.read(|c| {
            c.surveys.iter().filter(|s| s.is_active).cloned().collect()
        });
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(surveys)
    }

    async fn update(&self, id: &str, update: SurveyUpdate) -> StoreResult<Option<Survey>> {
        Ok(self.write(|c| {
            c.surveys.iter_mut().find(|s| s.id == id).map(|survey| {
                survey.title = update.title;
                survey.description = update.description;
                survey.questions = update.questions;
                survey.is_active = update.is_active;
                survey.updated_at = Utc::now();
                survey.clone()
            })
        }))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.write(|c| {
            let before = c.surveys.len();
            c.surveys.retain(|s| s.id != id);
            c.surveys.len() < before
        }))
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn create(&self, response: NewResponse) -> StoreResult<SurveyResponse> {
        let record = SurveyResponse {
            id: assign_id(),
            survey_id: response.survey_id,
            merchant_id: response.merchant_id,
            answers: response.answers,
            submitted_at: Utc::now(),
        };
        self.write(|c| c.responses.push(record.clone()));
        Ok(record)
    }

    async fn list_by_survey(&self, survey_id: &str) -> StoreResult<Vec<SurveyResponse>> {
        let mut responses: Vec<SurveyResponse> = self.read(|c| {
            c.responses
                .iter()
                .filter(|r| r.survey_id == survey_id)
                .cloned()
                .collect()
        });
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(responses)
    }

    async fn list_by_merchant(&self, merchant_id: &str) -> StoreResult<Vec<SurveyResponse>> {
        let mut responses: Vec<SurveyResponse> = self.read(|c| {
            c.responses
                .iter()
                .filter(|r| r.merchant_id == merchant_id)
                .cloned()
                .collect()
        });
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(responses)
    }

    async fn exists_for(&self, survey_id: &str, merchant_id: &str) -> StoreResult<bool> {
        Ok(self.read(|c| {
            c.responses
                .iter()
                .any(|r| r.survey_id == survey_id && r.merchant_id == merchant_id)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$2b$10$hash".into(),
            name: "Test".into(),
            phone: "0600000000".into(),
            role: Role::Company,
        }
    }

    fn new_survey(company_id: &str, is_active: bool) -> NewSurvey {
        NewSurvey {
            title: "t".into(),
            description: "d".into(),
            questions: Vec::new(),
            company_id: company_id.into(),
            is_active,
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let store = MemoryStore::new();
        let a = UserStore::create(&store, new_user("a@x.c")).await.expect("create");
        let b = UserStore::create(&store, new_user("b@x.c")).await.expect("create");
        assert_ne!(a.id, b.id);
        let found = store.find_by_email("a@x.c").await.expect("find");
        assert_eq!(found.map(|u| u.id), Some(a.id));
    }

    #[tokio::test]
    async fn company_listing_filters_and_sorts_newest_first() {
        let store = MemoryStore::new();
        let first = SurveyStore::create(&store, new_survey("c1", true))
            .await
            .expect("create");
        let _other = SurveyStore::create(&store, new_survey("c2", true))
            .await
            .expect("create");
        let second = SurveyStore::create(&store, new_survey("c1", false))
            .await
            .expect("create");

        let listed = store.list_by_company("c1").await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn active_listing_excludes_inactive() {
        let store = MemoryStore::new();
        let active = SurveyStore::create(&store, new_survey("c1", true))
            .await
            .expect("create");
        let _inactive = SurveyStore::create(&store, new_survey("c1", false))
            .await
            .expect("create");
        let listed = store.list_active().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_bumps_updated_at() {
        let store = MemoryStore::new();
        let survey = SurveyStore::create(&store, new_survey("c1", true))
            .await
            .expect("create");
        let updated = store
            .update(
                &survey.id,
                SurveyUpdate {
                    title: "new".into(),
                    description: "new d".into(),
                    questions: Vec::new(),
                    is_active: false,
                },
            )
            .await
            .expect("update")
            .expect("found");
        assert_eq!(updated.title, "new");
        assert!(!updated.is_active);
        assert!(updated.updated_at >= survey.updated_at);

        let missing = store
            .update(
                "no-such-id",
                SurveyUpdate {
                    title: "x".into(),
                    description: "x".into(),
                    questions: Vec::new(),
                    is_active: true,
                },
            )
            .await
            .expect("update");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_was_removed() {
        let store = MemoryStore::new();
        let survey = SurveyStore::create(&store, new_survey("c1", true))
            .await
            .expect("create");
        assert!(store.delete(&survey.id).await.expect("delete"));
        assert!(!store.delete(&survey.id).await.expect("delete"));
    }

    #[tokio::test]
    async fn exists_for_detects_the_pair_only() {
        let store = MemoryStore::new();
        ResponseStore::create(
            &store,
            NewResponse {
                survey_id: "s1".into(),
                merchant_id: "m1".into(),
                answers: Vec::new(),
            },
        )
        .await
        .expect("create");

        assert!(store.exists_for("s1", "m1").await.expect("exists"));
        assert!(!store.exists_for("s1", "m2").await.expect("exists"));
        assert!(!store.exists_for("s2", "m1").await.expect("exists"));
    }
}
