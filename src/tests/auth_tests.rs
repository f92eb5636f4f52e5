use std::sync::atomic::Ordering;

use axum::http::StatusCode;

use crate::models::mocks::{MOCK_PASSWORD, STALE_USER_EMAIL};
use crate::tests::testutils::test_app;

#[tokio::test]
async fn test_protected_route_redirects_anonymous_to_login() {
    let mut app = test_app().await;

    let res = app.get("/snippet/create").await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), Some("/user/login"));
    // the gate short-circuited before the cache-control stamp
    assert!(res.header("cache-control").is_none());
}

#[tokio::test]
async fn test_login_grants_access_and_marks_response_uncacheable() {
    let mut app = test_app().await;
    app.login().await;

    let res = app.get("/snippet/create").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("cache-control"), Some("no-store"));
}

#[tokio::test]
async fn test_login_rotates_the_session_token() {
    let mut app = test_app().await;

    let _token = app.fetch_csrf_token().await;
    let cookie_before = app.cookie.clone().unwrap();
    app.login().await;
    let cookie_after = app.cookie.clone().unwrap();

    assert_ne!(cookie_before, cookie_after);
}

#[tokio::test]
async fn test_stale_session_user_resolves_anonymous() {
    let mut app = test_app().await;

    // credentials verify, but the referenced user no longer exists
    app.login_as(STALE_USER_EMAIL, MOCK_PASSWORD).await;

    let res = app.get("/snippet/create").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), Some("/user/login"));
}

#[tokio::test]
async fn test_user_store_failure_is_a_server_error() {
    let mut app = test_app().await;
    app.login().await;

    app.users.exists_fail.store(true, Ordering::SeqCst);
    let res = app.get("/").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    // the client sees a generic body, not the store's message
    assert!(!res.body.contains("mock user store is down"));
}

#[tokio::test]
async fn test_anonymous_requests_skip_the_existence_check() {
    let mut app = test_app().await;

    // a broken user store must not affect anonymous browsing
    app.users.exists_fail.store(true, Ordering::SeqCst);
    let res = app.get("/").await;

    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_drops_authentication() {
    let mut app = test_app().await;
    let token = app.login().await;

    let res = app.post("/user/logout", &[("csrf_token", token.as_str())]).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), Some("/"));

    let res = app.get("/snippet/create").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), Some("/user/login"));
}
