//! Per-request log line.
//!
//! Logged on receipt, before dispatch, so requests that later panic or get
//! rejected still show up exactly once.

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, extract::Request, middleware::Next, response::Response};

pub async fn log_request(req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.to_string())
        .unwrap_or_else(|| "-".to_string());

    tracing::info!("{} - {:?} {} {}", remote, req.version(), req.method(), req.uri());

    next.run(req).await
}
