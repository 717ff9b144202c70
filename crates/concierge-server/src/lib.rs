//! Concierge credential server.
//!
//! Issues short-lived voice session credentials to consoles over
//! `POST /api/voice/session`.

pub mod api;
pub mod api_session;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use concierge_voice::CredentialService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Credential minting service.
    pub credentials: Arc<CredentialService>,
    /// Bearer keys accepted on the credential endpoint. Empty means open.
    pub api_keys: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(credentials: CredentialService, api_keys: Vec<String>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            api_keys: Arc::new(api_keys),
        }
    }
}

/// Maximum request body size (16 KiB). Credential requests are tiny.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/voice/session",
            post(api_session::create_session_handler),
        )
        .layer(axum::middleware::from_fn(middleware::api_key_middleware));

    Router::new()
        .route("/health", get(api::health))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
