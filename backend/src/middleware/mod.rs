//! Actix middleware for request tracing and rate limiting.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::RateLimit;
pub use trace::{RequestId, RequestTrace};
