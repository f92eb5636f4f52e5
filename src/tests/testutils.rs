//! Shared helpers: a test application with mock stores, a one-cookie jar,
//! and a CSRF token extractor for rendered forms.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::AppConfig;
use crate::models::mocks::{MockSnippetStore, MockUserStore, MOCK_EMAIL, MOCK_PASSWORD};
use crate::routes;
use crate::session;
use crate::state::AppState;

lazy_static! {
    // Matches the hidden input rendered into every form
    static ref CSRF_INPUT_RX: Regex =
        Regex::new(r#"name="csrf_token" value="([^"]+)""#).expect("csrf regex must compile");
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The assembled application plus handles onto its mock collaborators and a
/// single-cookie jar, mimicking one browser session.
pub struct TestApp {
    pub router: Router,
    pub snippets: Arc<MockSnippetStore>,
    pub users: Arc<MockUserStore>,
    pub cookie: Option<String>,
}

pub async fn test_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteStore::new(pool);
    store.migrate().await.unwrap();

    let cfg = AppConfig::default();
    let sessions = session::layer(store, &cfg.session);

    let snippets = Arc::new(MockSnippetStore::new());
    let users = Arc::new(MockUserStore::new());
    let state = AppState::with_stores(cfg, snippets.clone(), users.clone());

    TestApp { router: routes::router(state, sessions), snippets, users, cookie: None }
}

impl TestApp {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(form).unwrap();
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let req = builder.body(Body::from(body)).unwrap();
        self.send(req).await
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();

        // keep the session cookie like a browser would
        if let Some(set_cookie) = headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok()) {
            if let Some(pair) = set_cookie.split(';').next() {
                self.cookie = Some(pair.to_string());
            }
        }

        let body = res.into_body().collect().await.unwrap().to_bytes();
        TestResponse { status, headers, body: String::from_utf8_lossy(&body).to_string() }
    }

    /// Fetches the login page and returns the CSRF token bound to this
    /// session.
    pub async fn fetch_csrf_token(&mut self) -> String {
        let res = self.get("/user/login").await;
        assert_eq!(res.status, StatusCode::OK);
        extract_csrf_token(&res.body)
    }

    /// Runs the full login dance with the mock's known-good credentials.
    pub async fn login(&mut self) -> String {
        self.login_as(MOCK_EMAIL, MOCK_PASSWORD).await
    }

    /// Logs in with arbitrary credentials; returns the session's CSRF token.
    pub async fn login_as(&mut self, email: &str, password: &str) -> String {
        let token = self.fetch_csrf_token().await;
        let res = self
            .post(
                "/user/login",
                &[("csrf_token", token.as_str()), ("email", email), ("password", password)],
            )
            .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        token
    }
}

pub fn extract_csrf_token(body: &str) -> String {
    CSRF_INPUT_RX
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .expect("no CSRF token found in body")
}
