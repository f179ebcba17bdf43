//! Survey CRUD endpoints.
//!
//! Creation and listing are restricted to admin and company roles; single
//! reads allow any authenticated caller but enforce ownership (the owning
//! company or an admin). The active list serves any authenticated caller
//! a trimmed payload.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    ActiveSurvey, DomainError, Identity, NewSurvey, Question, Role, Survey, SurveyUpdate,
};
use crate::inbound::http::error::{ApiResult, store_failure};
use crate::inbound::http::identity::RequireRole;
use crate::inbound::http::state::HttpState;

const ACCESS_DENIED: &str = "Access denied";
const SURVEY_NOT_FOUND: &str = "Survey not found";

fn default_active() -> bool {
    true
}

/// Survey creation body; `isActive` defaults to true when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyRequest {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Survey update body; all mutable fields are replaced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSurveyRequest {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub is_active: bool,
}

/// Load a survey and enforce the ownership rule.
async fn load_owned_survey(
    state: &HttpState,
    identity: &Identity,
    survey_id: &str,
    failure_message: &'static str,
) -> ApiResult<Survey> {
    let survey = state
        .surveys
        .find_by_id(survey_id)
        .await
        .map_err(|e| store_failure(failure_message, &e))?
        .ok_or_else(|| DomainError::not_found(SURVEY_NOT_FOUND))?;
    if !survey.accessible_by(&identity.user_id, identity.role) {
        return Err(DomainError::forbidden(ACCESS_DENIED));
    }
    Ok(survey)
}

/// Create a survey owned by the caller.
#[utoipa::path(
    post,
    path = "/api/surveys",
    request_body = CreateSurveyRequest,
    responses(
        (status = 201, description = "Survey created", body = Survey),
        (status = 401, description = "Missing token", body = crate::inbound::http::error::ErrorBody),
        (status = 403, description = "Role not permitted", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["surveys"],
    operation_id = "createSurvey",
    security(("BearerToken" = []))
)]
#[post("")]
pub async fn create_survey(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<CreateSurveyRequest>,
) -> ApiResult<HttpResponse> {
    identity.require_role(&[Role::Admin, Role::Company])?;
    let payload = payload.into_inner();
    let survey = state
        .surveys
        .create(NewSurvey {
            title: payload.title,
            description: payload.description,
            questions: payload.questions,
            company_id: identity.user_id.clone(),
            is_active: payload.is_active,
        })
        .await
        .map_err(|e| store_failure("Failed to create survey", &e))?;
    tracing::info!(survey_id = %survey.id, company_id = %survey.company_id, "survey created");
    Ok(HttpResponse::Created().json(survey))
}

/// List the caller's own surveys, newest first.
#[utoipa::path(
    get,
    path = "/api/surveys",
    responses(
        (status = 200, description = "Surveys owned by the caller", body = [Survey]),
        (status = 401, description = "Missing token", body = crate::inbound::http::error::ErrorBody),
        (status = 403, description = "Role not permitted", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["surveys"],
    operation_id = "listSurveys",
    security(("BearerToken" = []))
)]
#[get("")]
pub async fn list_surveys(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<Survey>>> {
    identity.require_role(&[Role::Admin, Role::Company])?;
    let surveys = state
        .surveys
        .list_by_company(&identity.user_id)
        .await
        .map_err(|e| store_failure("Failed to fetch surveys", &e))?;
    Ok(web::Json(surveys))
}

/// Active surveys for respondents, trimmed to the public fields.
///
/// Registered before `/{id}` so the literal segment wins the route match.
#[utoipa::path(
    get,
    path = "/api/surveys/active/list",
    responses(
        (status = 200, description = "Active surveys", body = [ActiveSurvey]),
        (status = 401, description = "Missing token", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["surveys"],
    operation_id = "listActiveSurveys",
    security(("BearerToken" = []))
)]
#[get("/active/list")]
pub async fn list_active_surveys(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<web::Json<Vec<ActiveSurvey>>> {
    let surveys = state
        .surveys
        .list_active()
        .await
        .map_err(|e| store_failure("Failed to fetch active surveys", &e))?;
    Ok(web::Json(surveys.iter().map(ActiveSurvey::from).collect()))
}

/// Fetch one survey; the owning company and admins only.
#[utoipa::path(
    get,
    path = "/api/surveys/{id}",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Survey", body = Survey),
        (status = 403, description = "Not the owner", body = crate::inbound::http::error::ErrorBody),
        (status = 404, description = "Unknown survey", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["surveys"],
    operation_id = "getSurvey",
    security(("BearerToken" = []))
)]
#[get("/{id}")]
pub async fn get_survey(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Survey>> {
    let survey =
        load_owned_survey(&state, &identity, &path.into_inner(), "Failed to fetch survey").await?;
    Ok(web::Json(survey))
}

/// Replace a survey's mutable fields.
#[utoipa::path(
    put,
    path = "/api/surveys/{id}",
    params(("id" = String, Path, description = "Survey id")),
    request_body = UpdateSurveyRequest,
    responses(
        (status = 200, description = "Updated survey", body = Survey),
        (status = 403, description = "Not the owner", body = crate::inbound::http::error::ErrorBody),
        (status = 404, description = "Unknown survey", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["surveys"],
    operation_id = "updateSurvey",
    security(("BearerToken" = []))
)]
#[put("/{id}")]
pub async fn update_survey(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<UpdateSurveyRequest>,
) -> ApiResult<web::Json<Survey>> {
    identity.require_role(&[Role::Admin, Role::Company])?;
    let survey_id = path.into_inner();
    load_owned_survey(&state, &identity, &survey_id, "Failed to update survey").await?;

    let payload = payload.into_inner();
    let updated = state
        .surveys
        .update(
            &survey_id,
            SurveyUpdate {
                title: payload.title,
                description: payload.description,
                questions: payload.questions,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(|e| store_failure("Failed to update survey", &e))?
        .ok_or_else(|| DomainError::not_found(SURVEY_NOT_FOUND))?;
    Ok(web::Json(updated))
}

/// Delete a survey.
#[utoipa::path(
    delete,
    path = "/api/surveys/{id}",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Deletion confirmation"),
        (status = 403, description = "Not the owner", body = crate::inbound::http::error::ErrorBody),
        (status = 404, description = "Unknown survey", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["surveys"],
    operation_id = "deleteSurvey",
    security(("BearerToken" = []))
)]
#[delete("/{id}")]
pub async fn delete_survey(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    identity.require_role(&[Role::Admin, Role::Company])?;
    let survey_id = path.into_inner();
    load_owned_survey(&state, &identity, &survey_id, "Failed to delete survey").await?;

    state
        .surveys
        .delete(&survey_id)
        .await
        .map_err(|e| store_failure("Failed to delete survey", &e))?;
    tracing::info!(survey_id = %survey_id, "survey deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Survey deleted successfully" })))
}
