// SPDX-License-Identifier: MIT

//! Authentication, session, and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid session tokens
//! 2. Sessions work via both the cookie and the Authorization header
//! 3. Test-login issues a working session cookie
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn protected_route_without_token_is_rejected() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/audits")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_with_invalid_token_is_rejected() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/audits")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_with_bearer_token() {
    let (app, state) = common::create_test_app().await;
    let user = common::create_user(&state, "bearer@example.com").await;
    let token = common::session_token(&state, user.id);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/audits")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn protected_route_with_session_cookie() {
    let (app, state) = common::create_test_app().await;
    let user = common::create_user(&state, "cookie@example.com").await;
    let token = common::session_token(&state, user.id);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/audits")
                .header(header::COOKIE, format!("adaudit_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_wrong_credentials() {
    let (app, _) = common::create_test_app().await;

    let body = serde_json::json!({
        "email": "test@example.com",
        "password": "wrong-password",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/test-login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_issues_working_session_cookie() {
    let (app, _) = common::create_test_app().await;

    let body = serde_json::json!({
        "email": "test@example.com",
        "password": "testpass123",
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/test-login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("adaudit_token="));

    let user = common::json_body(response).await;
    assert_eq!(user["email"], "test@example.com");

    // The cookie authenticates subsequent requests
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/user")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let current = common::json_body(response).await;
    assert_eq!(current["email"], "test@example.com");
}

#[tokio::test]
async fn current_user_is_null_for_anonymous_callers() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::json_body(response).await, serde_json::Value::Null);
}

#[tokio::test]
async fn google_login_requires_configured_credentials() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/google")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Test config carries no Google OAuth credentials
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn health_check_is_public() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn cors_preflight_returns_headers() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/audits")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout should clear the session cookie")
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("adaudit_token="));

    let body = common::json_body(response).await;
    assert_eq!(body["message"], "Logged out successfully");
}
