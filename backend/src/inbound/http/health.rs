//! Health probe, API index, and the JSON 404 fallback.

use std::time::Instant;

use actix_web::{HttpRequest, HttpResponse, get, web};
use chrono::Utc;
use serde_json::json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process-level facts reported by the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    started_at: Instant,
    environment: String,
}

impl HealthState {
    /// Capture the startup instant and the configured environment name.
    #[must_use]
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            started_at: Instant::now(),
            environment: environment.into(),
        }
    }
}

/// Liveness and uptime report; unauthenticated.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service healthy")),
    tags = ["health"],
    operation_id = "health"
)]
#[get("/health")]
pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "version": VERSION,
        "environment": state.environment,
    }))
}

/// Root index listing the API surface; unauthenticated.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "API index")),
    tags = ["health"],
    operation_id = "apiIndex"
)]
#[get("/")]
pub async fn api_index(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Survey Platform API",
        "version": VERSION,
        "environment": state.environment,
        "endpoints": {
            "auth": "/api/auth",
            "surveys": "/api/surveys",
            "responses": "/api/responses",
            "health": "/health",
        },
    }))
}

/// Default service: any unmatched route gets a JSON 404 echoing the path
/// and method.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": "Route not found",
        "path": req.path(),
        "method": req.method().as_str(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    fn app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(HealthState::new("test")))
            .service(health)
            .service(api_index)
            .default_service(web::route().to(not_found))
    }

    #[actix_web::test]
    async fn health_reports_uptime_and_environment() {
        let app = actix_test::init_service(app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "test");
        assert!(body["uptime"].as_f64().is_some());
    }

    #[actix_web::test]
    async fn unmatched_routes_get_json_404() {
        let app = actix_test::init_service(app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/nope").to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 404);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["path"], "/nope");
        assert_eq!(body["method"], "GET");
    }
}
