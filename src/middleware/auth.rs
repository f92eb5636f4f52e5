//! Authentication resolution and the authorization gate.
//!
//! Resolution runs on every dynamic request: it derives the request's
//! identity from the server-side session plus a live existence check, never
//! from anything the client submits. The gate wraps protected routes only.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::session;
use crate::state::AppState;

/// Resolved request identity, attached to the request extensions for the
/// duration of one request and never persisted. Recomputed from scratch on
/// every request, so a deleted user loses access immediately even with a
/// live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestIdentity {
    pub user_id: Option<i64>,
}

impl RequestIdentity {
    pub const ANONYMOUS: Self = Self { user_id: None };

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Bound on the user-existence round trip; a timeout surfaces like any other
/// collaborator failure.
const EXISTS_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves whether the session carries a valid authenticated user.
///
/// Anonymous sessions pass straight through without a store call. A stored
/// id referencing a deleted user also passes through anonymous (the stale
/// session value is left untouched); only a store failure aborts the request.
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let identity = match session::authenticated_user_id(&session).await? {
        None => RequestIdentity::ANONYMOUS,
        Some(id) => {
            let exists = tokio::time::timeout(EXISTS_TIMEOUT, state.users.exists(id))
                .await
                .map_err(|_| AppError::Internal(anyhow::anyhow!("user existence check timed out")))??;
            if exists {
                RequestIdentity { user_id: Some(id) }
            } else {
                RequestIdentity::ANONYMOUS
            }
        }
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Authorization gate for routes requiring a signed-in user.
///
/// Unauthenticated requests are redirected to the login page and the chain
/// stops; authenticated responses are marked non-cacheable so protected
/// content never leaves a shared cache.
pub async fn require_auth(req: Request, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<RequestIdentity>()
        .map(RequestIdentity::is_authenticated)
        .unwrap_or(false);

    if !authenticated {
        return Redirect::to("/user/login").into_response();
    }

    let mut res = next.run(req).await;
    res.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    res
}
