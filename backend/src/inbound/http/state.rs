//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only
//! on the store ports and the token service. Backend selection (Firestore
//! vs. in-memory) happens once at startup; handlers never branch on it.

use std::sync::Arc;

use crate::domain::{KeyedLock, ResponseStore, SurveyStore, TokenService, UserStore};

/// Parameter object bundling the store ports for [`HttpState::new`].
#[derive(Clone)]
pub struct StorePorts {
    pub users: Arc<dyn UserStore>,
    pub surveys: Arc<dyn SurveyStore>,
    pub responses: Arc<dyn ResponseStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserStore>,
    pub surveys: Arc<dyn SurveyStore>,
    pub responses: Arc<dyn ResponseStore>,
    pub tokens: TokenService,
    /// Serialises check-then-write sections (unique email, one response
    /// per survey/merchant pair) within this process.
    pub locks: KeyedLock,
}

impl HttpState {
    /// Assemble the handler state from injected ports.
    #[must_use]
    pub fn new(ports: StorePorts, tokens: TokenService) -> Self {
        Self {
            users: ports.users,
            surveys: ports.surveys,
            responses: ports.responses,
            tokens,
            locks: KeyedLock::default(),
        }
    }
}
