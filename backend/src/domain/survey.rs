//! Surveys and their embedded questions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Question input widget kinds understood by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    Text,
    Textarea,
    MultipleChoice,
    Checkbox,
    Rating,
}

/// A question embedded in a survey. Questions have no lifecycle of their
/// own; they are replaced wholesale on survey update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Client-assigned identifier, opaque to the backend.
    pub id: String,
    /// Widget kind; the contract names this field `type`.
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Prompt text shown to respondents.
    pub question: String,
    /// Whether an answer is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Choice labels, used only for multiple-choice and checkbox kinds.
    #[serde(default)]
    pub options: Vec<String>,
}

/// Persisted survey document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    /// Store-assigned identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Ordered question sequence.
    pub questions: Vec<Question>,
    /// Owning company account (the creator's user id). Admin accounts
    /// have override access regardless of this field.
    pub company_id: String,
    /// Only active surveys accept responses.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Survey {
    /// Whether `user_id` with `role` may read or mutate this survey.
    #[must_use]
    pub fn accessible_by(&self, user_id: &str, role: crate::domain::Role) -> bool {
        role == crate::domain::Role::Admin || self.company_id == user_id
    }
}

/// Fields supplied when creating a survey; the store assigns id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewSurvey {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub company_id: String,
    pub is_active: bool,
}

/// Replacement values for the mutable survey fields.
#[derive(Debug, Clone)]
pub struct SurveyUpdate {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub is_active: bool,
}

/// Trimmed survey payload served to respondents on the active list:
/// `{id, title, description, questions, companyId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSurvey {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub company_id: String,
}

impl From<&Survey> for ActiveSurvey {
    fn from(survey: &Survey) -> Self {
        Self {
            id: survey.id.clone(),
            title: survey.title.clone(),
            description: survey.description.clone(),
            questions: survey.questions.clone(),
            company_id: survey.company_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use rstest::rstest;

    fn survey(company_id: &str) -> Survey {
        Survey {
            id: "s-1".into(),
            title: "Quarterly checkin".into(),
            description: "How is business going?".into(),
            questions: Vec::new(),
            company_id: company_id.into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("c-1", Role::Company, true)]
    #[case("c-2", Role::Company, false)]
    #[case("c-2", Role::Admin, true)]
    #[case("c-2", Role::Merchant, false)]
    fn ownership_checks(#[case] user: &str, #[case] role: Role, #[case] allowed: bool) {
        assert_eq!(survey("c-1").accessible_by(user, role), allowed);
    }

    #[test]
    fn question_kind_uses_kebab_case_and_type_field() {
        let q: Question = serde_json::from_str(
            r#"{"id":"q1","type":"multiple-choice","question":"Pick one","options":["a","b"]}"#,
        )
        .expect("question json");
        assert_eq!(q.kind, QuestionKind::MultipleChoice);
        assert!(!q.required);
        let json = serde_json::to_value(&q).expect("serialise");
        assert_eq!(json["type"], "multiple-choice");
    }

    #[test]
    fn active_survey_trims_status_and_timestamps() {
        let json = serde_json::to_value(ActiveSurvey::from(&survey("c-1"))).expect("serialise");
        assert_eq!(json["companyId"], "c-1");
        assert!(json.get("isActive").is_none());
        assert!(json.get("createdAt").is_none());
    }
}
