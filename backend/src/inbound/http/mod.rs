//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod identity;
pub mod responses;
pub mod state;
pub mod surveys;

pub use error::ApiResult;
