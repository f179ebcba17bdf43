//! Response submission and analytics endpoints.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Answer, DomainError, Identity, NewResponse, Role, SurveyResponse};
use crate::inbound::http::error::{ApiResult, store_failure};
use crate::inbound::http::identity::RequireRole;
use crate::inbound::http::state::HttpState;

/// Submission body: target survey plus ordered answers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    pub survey_id: String,
    pub answers: Vec<Answer>,
}

/// Submit a response to an active survey. One response per merchant per
/// survey; duplicates are rejected before anything is written.
#[utoipa::path(
    post,
    path = "/api/responses",
    request_body = SubmitResponseRequest,
    responses(
        (status = 201, description = "Response stored", body = SurveyResponse),
        (status = 400, description = "Inactive survey or duplicate response", body = crate::inbound::http::error::ErrorBody),
        (status = 404, description = "Unknown survey", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["responses"],
    operation_id = "submitResponse",
    security(("BearerToken" = []))
)]
#[post("")]
pub async fn submit_response(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<SubmitResponseRequest>,
) -> ApiResult<HttpResponse> {
    identity.require_role(&[Role::Merchant, Role::Admin])?;
    let payload = payload.into_inner();
    let merchant_id = identity.user_id;

    let survey = state
        .surveys
        .find_by_id(&payload.survey_id)
        .await
        .map_err(|e| store_failure("Failed to submit response", &e))?
        .ok_or_else(|| DomainError::not_found("Survey not found"))?;
    if !survey.is_active {
        return Err(DomainError::invalid_request("Survey is not active"));
    }

    // One response per (survey, merchant): serialise the existence check
    // and the write for this pair within the process.
    let _guard = state
        .locks
        .acquire(format!("response:{}:{merchant_id}", payload.survey_id))
        .await;

    let already = state
        .responses
        .exists_for(&payload.survey_id, &merchant_id)
        .await
        .map_err(|e| store_failure("Failed to submit response", &e))?;
    if already {
        return Err(DomainError::conflict(
            "You have already responded to this survey",
        ));
    }

    let response = state
        .responses
        .create(NewResponse {
            survey_id: payload.survey_id,
            merchant_id,
            answers: payload.answers,
        })
        .await
        .map_err(|e| store_failure("Failed to submit response", &e))?;
    tracing::info!(
        response_id = %response.id,
        survey_id = %response.survey_id,
        "response submitted"
    );
    Ok(HttpResponse::Created().json(response))
}

/// Responses to a survey, for its owning company or an admin.
#[utoipa::path(
    get,
    path = "/api/responses/survey/{surveyId}",
    params(("surveyId" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Responses, newest first", body = [SurveyResponse]),
        (status = 403, description = "Not the owner", body = crate::inbound::http::error::ErrorBody),
        (status = 404, description = "Unknown survey", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["responses"],
    operation_id = "listSurveyResponses",
    security(("BearerToken" = []))
)]
#[get("/survey/{surveyId}")]
pub async fn list_survey_responses(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SurveyResponse>>> {
    let survey_id = path.into_inner();
    let survey = state
        .surveys
        .find_by_id(&survey_id)
        .await
        .map_err(|e| store_failure("Failed to fetch responses", &e))?
        .ok_or_else(|| DomainError::not_found("Survey not found"))?;
    if !survey.accessible_by(&identity.user_id, identity.role) {
        return Err(DomainError::forbidden("Access denied"));
    }

    let responses = state
        .responses
        .list_by_survey(&survey_id)
        .await
        .map_err(|e| store_failure("Failed to fetch responses", &e))?;
    Ok(web::Json(responses))
}

/// The calling merchant's own submissions, newest first.
#[utoipa::path(
    get,
    path = "/api/responses/my-responses",
    responses(
        (status = 200, description = "Caller's responses", body = [SurveyResponse]),
        (status = 401, description = "Missing token", body = crate::inbound::http::error::ErrorBody),
        (status = 403, description = "Role not permitted", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["responses"],
    operation_id = "listMyResponses",
    security(("BearerToken" = []))
)]
#[get("/my-responses")]
pub async fn list_my_responses(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<SurveyResponse>>> {
    identity.require_role(&[Role::Merchant, Role::Admin])?;
    let responses = state
        .responses
        .list_by_merchant(&identity.user_id)
        .await
        .map_err(|e| store_failure("Failed to fetch responses", &e))?;
    Ok(web::Json(responses))
}
