//! Authentication endpoints: register, login, current user.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DomainError, Identity, NewUser, PublicUser, Role, password};
use crate::inbound::http::error::{ApiResult, store_failure};
use crate::inbound::http::state::HttpState;

/// Registration request body.
///
/// The role arrives as free text and is validated against the closed
/// role set; unknown values are rejected with `Invalid role`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
    pub name: String,
    pub phone: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus public user payload returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

fn issue_token(state: &HttpState, user_id: &str, email: &str, role: Role) -> ApiResult<String> {
    state.tokens.issue(user_id, email, role).map_err(|e| {
        tracing::error!(error = %e, "token issuance failed");
        DomainError::internal("Registration failed")
    })
}

/// Register a new account and issue its first token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid role or duplicate email", body = crate::inbound::http::error::ErrorBody),
        (status = 500, description = "Registration failed", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let role: Role = payload
        .role
        .parse()
        .map_err(|_| DomainError::invalid_request("Invalid role"))?;

    // Email uniqueness is check-then-write; serialise per email within
    // this process. Multi-process deployments can still race.
    let _guard = state.locks.acquire(format!("email:{}", payload.email)).await;

    let existing = state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(|e| store_failure("Registration failed", &e))?;
    if existing.is_some() {
        return Err(DomainError::conflict("User already exists"));
    }

    let password_hash = password::hash(&payload.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        DomainError::internal("Registration failed")
    })?;

    let user = state
        .users
        .create(NewUser {
            email: payload.email,
            password_hash,
            name: payload.name,
            phone: payload.phone,
            role,
        })
        .await
        .map_err(|e| store_failure("Registration failed", &e))?;

    let token = issue_token(&state, &user.id, &user.email, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// Exchange email and password for a fresh token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Unknown user or wrong password", body = crate::inbound::http::error::ErrorBody),
        (status = 500, description = "Login failed", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(|e| store_failure("Login failed", &e))?
        .ok_or_else(|| DomainError::invalid_request("User not found"))?;

    let valid = password::verify(&payload.password, &user.password_hash).map_err(|e| {
        tracing::error!(error = %e, user_id = %user.id, "stored hash unreadable");
        DomainError::internal("Login failed")
    })?;
    if !valid {
        return Err(DomainError::invalid_request("Invalid password"));
    }

    let token = state
        .tokens
        .issue(&user.id, &user.email, user.role)
        .map_err(|e| {
            tracing::error!(error = %e, "token issuance failed");
            DomainError::internal("Login failed")
        })?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// Return the authenticated caller's account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 400, description = "Invalid token", body = crate::inbound::http::error::ErrorBody),
        (status = 401, description = "Missing token", body = crate::inbound::http::error::ErrorBody),
        (status = 404, description = "User record gone", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("BearerToken" = []))
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<PublicUser>> {
    let user = state
        .users
        .find_by_id(&identity.user_id)
        .await
        .map_err(|e| store_failure("Failed to get user", &e))?
        .ok_or_else(|| DomainError::not_found("User not found"))?;
    Ok(web::Json(PublicUser::from(&user)))
}
