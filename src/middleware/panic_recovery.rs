//! Unwind boundary for the whole pipeline.
//!
//! This is the single place where an unexpected failure in any downstream
//! stage or handler becomes a well-formed response instead of a crashed
//! worker. The response carries `Connection: close` so the transport does
//! not reuse a connection whose stream state is unknown.

use std::panic::AssertUnwindSafe;

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;

/// Catches any unwind from downstream stages and converts it into a generic
/// 500 response. The panic payload is logged server-side, never sent to the
/// client.
pub async fn recover_panic(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let detail = if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic.downcast_ref::<&str>() {
                (*s).to_string()
            } else {
                "non-string panic payload".to_string()
            };
            tracing::error!("panic while handling {} {}: {}", method, path, detail);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONNECTION, HeaderValue::from_static("close"))],
                "Internal Server Error",
            )
                .into_response()
        }
    }
}
