use axum::{http::StatusCode, response::IntoResponse};

// Liveness probe - mounted outside the session/CSRF stages
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
