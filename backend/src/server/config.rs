//! Server configuration sourced from the environment.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::outbound::persistence::FirestoreConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_JWT_SECRET: &str = "your-secret-key";
const DEFAULT_RATE_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_GLOBAL_MAX_REQUESTS: u64 = 1000;
const DEFAULT_AUTH_MAX_REQUESTS: u64 = 20;

/// Everything the server needs to assemble itself, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    /// Durable-store settings; the in-memory store is used when absent.
    pub firestore: Option<FirestoreConfig>,
    pub rate_window: Duration,
    pub global_max_requests: u64,
    pub auth_max_requests: u64,
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Resolve configuration from environment variables, falling back to
    /// development defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using an insecure development default");
            DEFAULT_JWT_SECRET.to_owned()
        });
        let firestore = env::var("FIRESTORE_PROJECT_ID")
            .ok()
            .map(|project_id| FirestoreConfig {
                project_id,
                emulator_host: env::var("FIRESTORE_EMULATOR_HOST").ok(),
                auth_token: env::var("FIRESTORE_AUTH_TOKEN").ok(),
            });
        Self {
            port: env_parsed("PORT", DEFAULT_PORT),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_owned()),
            jwt_secret,
            firestore,
            rate_window: Duration::from_secs(env_parsed(
                "RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_WINDOW_SECS,
            )),
            global_max_requests: env_parsed("RATE_LIMIT_MAX", DEFAULT_GLOBAL_MAX_REQUESTS),
            auth_max_requests: env_parsed("AUTH_RATE_LIMIT_MAX", DEFAULT_AUTH_MAX_REQUESTS),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_owned(),
            jwt_secret: DEFAULT_JWT_SECRET.to_owned(),
            firestore: None,
            rate_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
            global_max_requests: DEFAULT_GLOBAL_MAX_REQUESTS,
            auth_max_requests: DEFAULT_AUTH_MAX_REQUESTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development_friendly() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, "development");
        assert_eq!(config.jwt_secret, "your-secret-key");
        assert!(config.firestore.is_none());
        assert_eq!(config.rate_window, Duration::from_secs(900));
        assert_eq!(config.global_max_requests, 1000);
        assert_eq!(config.auth_max_requests, 20);
    }
}
