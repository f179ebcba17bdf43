//! Survey platform backend library.
//!
//! Hexagonal layout: the domain owns entities, the token service and the
//! store ports; `inbound::http` adapts them to actix-web; the
//! `outbound::persistence` adapters implement the ports against Firestore
//! or process memory; `server` assembles the application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
