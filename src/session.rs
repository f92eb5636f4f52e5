//! Session keys and the login/logout state machine.
//!
//! The session itself lives server-side (SQLite via `tower-sessions`); the
//! cookie carries only an opaque token. Everything that mutates
//! authentication state goes through this module so the contract stays in
//! one place: login rotates the session id *before* writing the user id
//! (fixation defense), logout clears the key and rotates again.

use time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::SessionConfig;
use crate::error::AppResult;

/// Session key holding the signed-in user's id. Absent or zero means anonymous.
pub const AUTH_USER_ID_KEY: &str = "authenticated_user_id";

/// Session key for the one-shot flash message.
pub const FLASH_KEY: &str = "flash";

/// Session key for the per-session CSRF token.
pub const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Cookie name for the opaque session token.
pub const SESSION_COOKIE: &str = "session";

/// Builds the session layer: HttpOnly, root-scoped cookie with a sliding
/// expiry. Sessions are created lazily on first write.
pub fn layer(store: SqliteStore, cfg: &SessionConfig) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_path("/")
        .with_http_only(true)
        .with_secure(cfg.cookie_secure)
        .with_expiry(Expiry::OnInactivity(Duration::hours(cfg.lifetime_hours)))
}

/// Marks the session as authenticated for `user_id`.
///
/// The session id is cycled first so a token planted before login never
/// identifies an authenticated session.
pub async fn login(session: &Session, user_id: i64) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(AUTH_USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Clears the authenticated-user marker and cycles the session id.
pub async fn logout(session: &Session) -> AppResult<()> {
    session.remove::<i64>(AUTH_USER_ID_KEY).await?;
    session.cycle_id().await?;
    Ok(())
}

/// Reads the stored user id, if any. Zero is normalized to `None`.
pub async fn authenticated_user_id(session: &Session) -> AppResult<Option<i64>> {
    let id: Option<i64> = session.get(AUTH_USER_ID_KEY).await?;
    Ok(id.filter(|id| *id != 0))
}

/// Stores a one-shot flash message for the next rendered page.
pub async fn put_flash(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH_KEY, message).await?;
    Ok(())
}

/// Removes and returns the flash message; a second call returns `None`.
pub async fn pop_flash(session: &Session) -> AppResult<Option<String>> {
    Ok(session.remove::<String>(FLASH_KEY).await?)
}
