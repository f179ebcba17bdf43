//! OpenAPI document for the survey platform API.
//!
//! Registers every HTTP endpoint plus the schemas for domain payloads and
//! request/response bodies, and declares the bearer token security scheme
//! referenced by the protected endpoints.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    ActiveSurvey, Answer, AnswerValue, PublicUser, Question, QuestionKind, Role, Survey,
    SurveyResponse,
};
use crate::inbound::http::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::responses::SubmitResponseRequest;
use crate::inbound::http::surveys::{CreateSurveyRequest, UpdateSurveyRequest};

/// Adds the `BearerToken` scheme the endpoint annotations reference.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Survey Platform API",
        description = "Authentication, survey management and response collection."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::surveys::create_survey,
        crate::inbound::http::surveys::list_surveys,
        crate::inbound::http::surveys::list_active_surveys,
        crate::inbound::http::surveys::get_survey,
        crate::inbound::http::surveys::update_survey,
        crate::inbound::http::surveys::delete_survey,
        crate::inbound::http::responses::submit_response,
        crate::inbound::http::responses::list_survey_responses,
        crate::inbound::http::responses::list_my_responses,
        crate::inbound::http::health::health,
        crate::inbound::http::health::api_index,
    ),
    components(schemas(
        Role,
        PublicUser,
        QuestionKind,
        Question,
        Survey,
        ActiveSurvey,
        Answer,
        AnswerValue,
        SurveyResponse,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        CreateSurveyRequest,
        UpdateSurveyRequest,
        SubmitResponseRequest,
        ErrorBody,
    )),
    tags(
        (name = "auth", description = "Registration, login and identity"),
        (name = "surveys", description = "Survey management"),
        (name = "responses", description = "Response submission and analytics"),
        (name = "health", description = "Service health and discovery")
    )
)]
pub struct ApiDoc;
