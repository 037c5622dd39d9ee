//! HTTP API
//! Mission: Expose the session and account operations over axum

pub mod handlers;
pub mod routes;

use crate::session::SessionManager;
use crate::store::UserStore;
use crate::tokens::TokenIssuer;
use std::sync::Arc;

/// Shared application state, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub issuer: Arc<TokenIssuer>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(store: Arc<UserStore>, issuer: Arc<TokenIssuer>) -> Self {
        let sessions = Arc::new(SessionManager::new(store.clone(), issuer.clone()));
        Self {
            store,
            issuer,
            sessions,
        }
    }
}
