//! Cross-Site Request Forgery (CSRF) protection middleware.
//!
//! Every session gets a random token bound on first contact and re-used for
//! the session's lifetime. Safe methods pass through uninspected but have
//! the token attached to the request so rendered forms can embed it; unsafe
//! methods must carry the matching token in the urlencoded body field
//! `csrf_token` or the request is rejected before any handler runs.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};
use rand::RngCore;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::session::CSRF_TOKEN_KEY;

/// Name of the hidden form field carrying the token.
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Cap on buffered form bodies; matches the router-wide body limit.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// The token bound to the current session, attached to every request passing
/// the CSRF stage. Handlers embed it into rendered forms.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

pub async fn csrf_middleware(session: Session, req: Request, next: Next) -> AppResult<Response> {
    // Bind a token on first contact; later requests re-use it.
    let token = match session.get::<String>(CSRF_TOKEN_KEY).await? {
        Some(token) => token,
        None => {
            let token = generate_token();
            session.insert(CSRF_TOKEN_KEY, &token).await?;
            token
        }
    };

    let mut req = req;
    if is_unsafe(req.method()) {
        // The check consumes the body, so buffer it and hand the handler a copy.
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|_| AppError::BadRequest("request body unreadable or too large".to_string()))?;

        let submitted = form_field(&bytes, CSRF_FORM_FIELD);
        let matches = submitted.as_deref().map(|s| tokens_match(&token, s)).unwrap_or(false);
        if !matches {
            return Err(AppError::BadRequest("invalid CSRF token".to_string()));
        }

        req = Request::from_parts(parts, Body::from(bytes));
    }

    req.extensions_mut().insert(CsrfToken(token));
    Ok(next.run(req).await)
}

/// State-changing methods require token validation.
fn is_unsafe(method: &Method) -> bool {
    !matches!(method, &Method::GET | &Method::HEAD | &Method::OPTIONS | &Method::TRACE)
}

/// 32 random bytes, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time comparison to prevent timing attacks.
fn tokens_match(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    if expected.len() != provided.len() {
        return false;
    }
    let mut diff = 0u8;
    for (a, b) in expected.iter().zip(provided.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

/// Pulls one field out of an urlencoded body. Unparseable bodies yield
/// `None`, which the caller treats as a missing token.
fn form_field(bytes: &[u8], name: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes).ok()?;
    pairs.into_iter().find(|(key, _)| key == name).map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc12"));
        assert!(!tokens_match("abc123", ""));
    }

    #[test]
    fn test_form_field_extraction() {
        let body = b"title=Hello+world&csrf_token=deadbeef&expires=7";
        assert_eq!(form_field(body, "csrf_token").as_deref(), Some("deadbeef"));
        assert_eq!(form_field(body, "title").as_deref(), Some("Hello world"));
        assert_eq!(form_field(body, "missing"), None);
    }

    #[test]
    fn test_unsafe_method_classification() {
        assert!(is_unsafe(&Method::POST));
        assert!(is_unsafe(&Method::PUT));
        assert!(is_unsafe(&Method::DELETE));
        assert!(is_unsafe(&Method::PATCH));
        assert!(!is_unsafe(&Method::GET));
        assert!(!is_unsafe(&Method::HEAD));
        assert!(!is_unsafe(&Method::OPTIONS));
    }
}
