//! Fixed-window per-client rate limiting.
//!
//! Each client IP gets a counter that resets when its window elapses.
//! Requests over the limit are rejected with a 429 body carrying a
//! `retryAfter` hint in seconds. State lives in process memory, so limits
//! apply per instance rather than across a fleet. Expired windows are
//! swept whenever a new client shows up, keeping the map bounded by the
//! set of clients active within one window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::DomainError;

struct Window {
    started: Instant,
    count: u64,
}

#[derive(Clone)]
struct Limiter {
    max_requests: u64,
    window: Duration,
    message: &'static str,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl Limiter {
    /// Records a hit for `key` and reports whether it stays within the limit.
    fn check(&self, key: &str) -> Result<(), DomainError> {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        if !windows.contains_key(key) {
            // A new client costs one map entry; reclaim the entries whose
            // windows have already elapsed so the map tracks active
            // clients only.
            windows.retain(|_, window| now.duration_since(window.started) < self.window);
        }
        let window = windows.entry(key.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        window.count += 1;
        if window.count > self.max_requests {
            warn!(client = %key, limit = self.max_requests, "rate limit exceeded");
            return Err(DomainError::too_many_requests(
                self.message,
                self.window.as_secs(),
            ));
        }
        Ok(())
    }
}

/// Middleware factory limiting each client IP to `max_requests` per `window`.
#[derive(Clone)]
pub struct RateLimit {
    limiter: Limiter,
}

impl RateLimit {
    #[must_use]
    pub fn new(max_requests: u64, window: Duration, message: &'static str) -> Self {
        Self {
            limiter: Limiter {
                max_requests,
                window,
                message,
                windows: Arc::new(Mutex::new(HashMap::new())),
            },
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Limiter,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = req
            .connection_info()
            .realip_remote_addr()
            .map_or_else(|| "unknown".to_owned(), ToOwned::to_owned);
        if let Err(err) = self.limiter.check(&key) {
            return Box::pin(ready(Err(err.into())));
        }
        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use serde_json::Value;

    #[actix_web::test]
    async fn requests_within_the_limit_pass_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RateLimit::new(
                    2,
                    Duration::from_secs(60),
                    "Too many requests, please try again later.",
                ))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;
        for _ in 0..2 {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri("/ping").to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
        }
    }

    #[actix_web::test]
    async fn requests_over_the_limit_get_429_with_retry_hint() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RateLimit::new(
                    1,
                    Duration::from_secs(60),
                    "Too many requests, please try again later.",
                ))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;
        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/ping").to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = actix_test::try_call_service(
            &app,
            actix_test::TestRequest::get().uri("/ping").to_request(),
        )
        .await;
        let err = second.expect_err("second request should be rejected");
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let bytes = actix_web::body::to_bytes(res.into_body())
            .await
            .expect("response body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            body["error"],
            "Too many requests, please try again later."
        );
        assert_eq!(body["retryAfter"], 60);
    }

    #[actix_web::test]
    async fn windows_reset_after_expiry() {
        let limiter = Limiter {
            max_requests: 1,
            window: Duration::from_millis(10),
            message: "Too many requests, please try again later.",
            windows: Arc::new(Mutex::new(HashMap::new())),
        };
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_err());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(limiter.check("10.0.0.1").is_ok());
    }

    #[actix_web::test]
    async fn stale_windows_are_dropped_when_new_clients_arrive() {
        let limiter = Limiter {
            max_requests: 1,
            window: Duration::from_millis(10),
            message: "Too many requests, please try again later.",
            windows: Arc::new(Mutex::new(HashMap::new())),
        };
        assert!(limiter.check("10.0.0.1").is_ok());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(limiter.check("10.0.0.2").is_ok());

        let windows = limiter.windows.lock().expect("windows");
        assert!(!windows.contains_key("10.0.0.1"));
        assert!(windows.contains_key("10.0.0.2"));
    }

    #[actix_web::test]
    async fn distinct_clients_have_independent_windows() {
        let limiter = Limiter {
            max_requests: 1,
            window: Duration::from_secs(60),
            message: "Too many requests, please try again later.",
            windows: Arc::new(Mutex::new(HashMap::new())),
        };
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.2").is_ok());
        assert!(limiter.check("10.0.0.1").is_err());
    }
}
