//! HTTP route handlers and router assembly.
//!
//! - `health`: liveness probe, exempt from the session stages
//! - `snippets`: browsing and creating snippets
//! - `users`: signup, login and logout
//!
//! [`router`] is the single place where stage ordering is spelled out; the
//! layer list reads bottom-up (the last `.layer` call is the outermost
//! stage).

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;

use crate::error::AppError;
use crate::middleware;
use crate::state::AppState;

pub mod health;
pub mod snippets;
pub mod users;

/// Maximum accepted request body (form posts are tiny).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assembles the full application router.
///
/// Chain order per request: panic isolation → security headers → request
/// log → route match → [session → CSRF → authentication resolution] →
/// optional authorization gate → handler. `/ping` and `/static` skip the
/// bracketed session stages entirely.
pub fn router(state: AppState, sessions: SessionManagerLayer<SqliteStore>) -> Router {
    let protected = Router::new()
        .route("/snippet/create", get(snippets::create_form).post(snippets::create_submit))
        .route("/user/logout", post(users::logout))
        .route_layer(from_fn(middleware::auth::require_auth));

    let dynamic = Router::new()
        .route("/", get(snippets::home))
        .route("/snippet/view/{id}", get(snippets::view))
        .route("/user/signup", get(users::signup_form).post(users::signup_submit))
        .route("/user/login", get(users::login_form).post(users::login_submit))
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), middleware::auth::authenticate))
        .layer(from_fn(middleware::csrf::csrf_middleware))
        .layer(sessions);

    let cfg = state.config.clone();

    Router::new()
        .merge(dynamic)
        .route("/ping", get(health::ping))
        .nest_service("/static", ServeDir::new("ui/static"))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(middleware::request_log::log_request))
        .layer(from_fn_with_state(cfg, middleware::security_headers::security_headers_middleware))
        .layer(from_fn(middleware::panic_recovery::recover_panic))
}

async fn not_found() -> AppError {
    AppError::NotFound("no such page".to_string())
}
