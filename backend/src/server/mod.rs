//! Server assembly: store selection, app wiring, bootstrap.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{error, info};

use crate::domain::TokenService;
use crate::inbound::http::auth::{current_user, login, register};
use crate::inbound::http::health::{HealthState, api_index, health, not_found};
use crate::inbound::http::responses::{list_my_responses, list_survey_responses, submit_response};
use crate::inbound::http::state::{HttpState, StorePorts};
use crate::inbound::http::surveys::{
    create_survey, delete_survey, get_survey, list_active_surveys, list_surveys, update_survey,
};
use crate::middleware::{RateLimit, RequestTrace};
use crate::outbound::persistence::{FirestoreStore, MemoryStore};

const GLOBAL_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";
const AUTH_LIMIT_MESSAGE: &str = "Too many authentication attempts, please try again later.";

/// Survey question payloads can get large; accept bodies up to 10 MB.
const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

fn memory_ports() -> StorePorts {
    let store = Arc::new(MemoryStore::new());
    StorePorts {
        users: store.clone(),
        surveys: store.clone(),
        responses: store,
    }
}

/// Pick the store backend once at startup.
///
/// Firestore is used when a project id is configured and the client can be
/// built; otherwise the process-local in-memory store serves all three
/// ports.
fn build_store_ports(config: &ServerConfig) -> StorePorts {
    let Some(firestore) = &config.firestore else {
        info!("no Firestore project configured, using in-memory store");
        return memory_ports();
    };
    match FirestoreStore::new(firestore) {
        Ok(store) => {
            info!(project_id = %firestore.project_id, "using Firestore store");
            let store = Arc::new(store);
            StorePorts {
                users: store.clone(),
                surveys: store.clone(),
                responses: store,
            }
        }
        Err(err) => {
            error!(error = %err, "Firestore unavailable, falling back to in-memory store");
            memory_ports()
        }
    }
}

/// Everything [`build_app`] needs; cloned into each worker's app instance
/// so rate-limit windows are shared across workers.
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub health_state: web::Data<HealthState>,
    pub global_limit: RateLimit,
    pub auth_limit: RateLimit,
}

impl AppDependencies {
    /// Assemble dependencies from resolved configuration and store ports.
    #[must_use]
    pub fn new(config: &ServerConfig, ports: StorePorts) -> Self {
        Self {
            http_state: web::Data::new(HttpState::new(
                ports,
                TokenService::new(&config.jwt_secret),
            )),
            health_state: web::Data::new(HealthState::new(config.environment.clone())),
            global_limit: RateLimit::new(
                config.global_max_requests,
                config.rate_window,
                GLOBAL_LIMIT_MESSAGE,
            ),
            auth_limit: RateLimit::new(
                config.auth_max_requests,
                config.rate_window,
                AUTH_LIMIT_MESSAGE,
            ),
        }
    }
}

/// Assemble the application: routes, scopes, middleware, fallback.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        health_state,
        global_limit,
        auth_limit,
    } = deps;

    let json_config = web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| {
            crate::domain::DomainError::invalid_request(err.to_string()).into()
        });

    let auth = web::scope("/auth")
        .wrap(auth_limit)
        .service(register)
        .service(login)
        .service(current_user);

    // `/active/list` must register before `/{id}` so it is matched first.
    let surveys = web::scope("/surveys")
        .service(list_active_surveys)
        .service(create_survey)
        .service(list_surveys)
        .service(get_survey)
        .service(update_survey)
        .service(delete_survey);

    let responses = web::scope("/responses")
        .service(list_my_responses)
        .service(submit_response)
        .service(list_survey_responses);

    let api = web::scope("/api")
        .wrap(global_limit)
        .service(auth)
        .service(surveys)
        .service(responses);

    App::new()
        .app_data(json_config)
        .app_data(http_state)
        .app_data(health_state)
        .wrap(RequestTrace)
        .service(api)
        .service(health)
        .service(api_index)
        .default_service(web::route().to(not_found))
}

/// Construct the HTTP server from resolved configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the listener fails.
pub fn create_server(config: &ServerConfig) -> std::io::Result<Server> {
    let ports = build_store_ports(config);
    let deps = AppDependencies::new(config, ports);
    info!(
        port = config.port,
        environment = %config.environment,
        global_limit = config.global_max_requests,
        auth_limit = config.auth_max_requests,
        window_secs = config.rate_window.as_secs(),
        "starting survey platform backend"
    );
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(("0.0.0.0", config.port))?
        .run();
    Ok(server)
}
