//! Middleware components for HTTP request processing.
//!
//! Each stage is an independent `async fn` combined by explicit `.layer`
//! ordering in [`crate::routes::router`]. Outermost to innermost: panic
//! isolation, security headers, request logging, then — for dynamic routes
//! only — session loading, CSRF protection and authentication resolution,
//! with the authorization gate wrapping protected routes.

pub mod auth;
pub mod csrf;
pub mod panic_recovery;
pub mod request_log;
pub mod security_headers;
