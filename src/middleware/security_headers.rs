//! Security headers middleware for HTTP responses.
//!
//! Stamps a fixed set of security-related headers on every response passing
//! through it. Stateless apart from the read-only configuration, which may
//! override the Content-Security-Policy and enable HSTS.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::config::AppConfig;

const DEFAULT_CSP: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

/// Adds standard security-related HTTP headers to all responses.
///
/// - `Content-Security-Policy` restricts sources to self plus Google Fonts
/// - `Referrer-Policy: origin-when-cross-origin` limits referrer leakage
/// - `X-Content-Type-Options: nosniff` prevents MIME-type sniffing
/// - `X-Frame-Options: deny` prevents clickjacking
/// - `X-XSS-Protection: 0` disables the legacy, bypassable filter
/// - Optional: `Strict-Transport-Security` (HSTS) via configuration
pub async fn security_headers_middleware(
    State(cfg): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();

    let csp = cfg
        .security
        .as_ref()
        .and_then(|sec| sec.csp.as_deref())
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| HeaderValue::from_str(s).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CSP));
    headers.insert(HeaderName::from_static("content-security-policy"), csp);

    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("origin-when-cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(HeaderName::from_static("x-frame-options"), HeaderValue::from_static("deny"));
    headers.insert(HeaderName::from_static("x-xss-protection"), HeaderValue::from_static("0"));

    // Optional: HSTS via configuration
    if let Some(sec) = cfg.security.as_ref() {
        if sec.enable_hsts.unwrap_or(false) {
            let max_age = sec.hsts_max_age.unwrap_or(31536000); // 1 year
            let include_sub =
                if sec.hsts_include_subdomains.unwrap_or(false) { "; includeSubDomains" } else { "" };
            let value = format!("max-age={}{}", max_age, include_sub);
            headers.insert(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_str(&value).unwrap_or(HeaderValue::from_static("max-age=31536000")),
            );
        }
    }

    res
}
