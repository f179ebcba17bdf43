//! Survey responses submitted by merchants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single answer value: free text, or the selected labels for
/// checkbox-style questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Selection(Vec<String>),
}

/// Answer to one question, addressed by position in the survey's
/// question sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_index: usize,
    pub answer: AnswerValue,
}

/// Persisted response document. Immutable once created; at most one per
/// `(survey_id, merchant_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    /// Store-assigned identifier.
    pub id: String,
    pub survey_id: String,
    /// Submitting merchant (weak reference by user id).
    pub merchant_id: String,
    pub answers: Vec<Answer>,
    pub submitted_at: DateTime<Utc>,
}

/// Fields supplied on submission; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub survey_id: String,
    pub merchant_id: String,
    pub answers: Vec<Answer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_accept_text_and_selections() {
        let json = r#"[
            {"questionIndex": 0, "answer": "fine"},
            {"questionIndex": 1, "answer": ["mon", "wed"]}
        ]"#;
        let answers: Vec<Answer> = serde_json::from_str(json).expect("answers json");
        assert_eq!(answers[0].answer, AnswerValue::Text("fine".into()));
        assert_eq!(
            answers[1].answer,
            AnswerValue::Selection(vec!["mon".into(), "wed".into()])
        );
    }

    #[test]
    fn response_serialises_camel_case() {
        let response = SurveyResponse {
            id: "r-1".into(),
            survey_id: "s-1".into(),
            merchant_id: "m-1".into(),
            answers: Vec::new(),
            submitted_at: Utc::now(),
        };
        let json = serde_json::to_value(&response).expect("serialise");
        assert_eq!(json["surveyId"], "s-1");
        assert_eq!(json["merchantId"], "m-1");
        assert!(json.get("submittedAt").is_some());
    }
}
